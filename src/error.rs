//! Error types for cutover
//!
//! Uses `thiserror` for library errors. User-declined confirmation is not
//! represented here: declining the gate is a normal no-op exit, not a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cutover operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Hint appended when a remote command dies with git's transport exit status.
pub const GIT_SSH_HINT: &str = "This likely means git was unable to connect via SSH, \
or is asking for first-time host key verification.";

/// Exit status git returns on transport-level SSH failures.
pub const GIT_SSH_EXIT_STATUS: i32 = 128;

/// Main error type for cutover operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// No configuration file could be located
    #[error("no configuration file found - create cutover.toml or ~/.config/cutover/config.toml")]
    ConfigNotFound,

    /// An explicitly requested configuration file does not exist
    #[error("configuration file not found: {path}")]
    ConfigFileMissing { path: PathBuf },

    /// The configuration file has no [instances] table
    #[error("no instances are configured in {path}")]
    NoInstances { path: PathBuf },

    /// The requested instance name is not configured
    #[error("the instance '{name}' is not configured. Valid instance names are: {}", .valid.join(", "))]
    UnknownInstance { name: String, valid: Vec<String> },

    /// Neither `requirements` nor `pip_command` is set for the instance
    #[error("instance '{instance}' has neither 'requirements' nor 'pip_command' - exactly one is required")]
    MissingInstallDirective { instance: String },

    /// Both `requirements` and `pip_command` are set for the instance
    #[error("instance '{instance}' has both 'requirements' and 'pip_command' - they are mutually exclusive")]
    ConflictingInstallDirective { instance: String },

    /// Could not establish a remote session
    #[error("could not connect to {server} as {user}: {detail}")]
    Connection {
        server: String,
        user: String,
        detail: String,
    },

    /// A remote command finished with a non-zero exit status
    #[error("aborting: {command} failed with exit status {exit_status}.")]
    RemoteCommand { command: String, exit_status: i32 },

    /// The confirmation prompt could not be read
    #[error("could not read confirmation input")]
    Prompt(#[from] dialoguer::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DeployError {
    /// An operator-facing hint for well-known failure statuses, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DeployError::RemoteCommand { exit_status, .. }
                if *exit_status == GIT_SSH_EXIT_STATUS =>
            {
                Some(GIT_SSH_HINT)
            }
            _ => None,
        }
    }
}
