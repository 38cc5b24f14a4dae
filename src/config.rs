//! Configuration module for cutover
//!
//! Instance definitions live in a TOML file. Lookup order:
//! 1. `--config <path>` flag (highest priority)
//! 2. `./cutover.toml`
//! 3. `~/.config/cutover/config.toml`
//!
//! Every required field's absence is a distinct, named failure surfaced at
//! startup, before any remote connection is opened.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DeployError, DeployResult};

/// Default working-name template: instance name plus branch.
pub const DEFAULT_CLONE_DIR_FORMAT: &str = "{name}-{branch}";

/// Top-level configuration: a mapping from instance name to [`Instance`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Template for the working directory name. Placeholders: `{name}`,
    /// `{instance}`, `{branch}`, `{server_user}`.
    #[serde(default = "default_clone_dir_format")]
    pub clone_dir_format: String,

    #[serde(default)]
    pub instances: HashMap<String, Instance>,
}

fn default_clone_dir_format() -> String {
    DEFAULT_CLONE_DIR_FORMAT.to_string()
}

/// Immutable configuration record for one deployable target.
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    /// Application name, used in the working directory name
    pub name: String,
    /// Branch to clone
    pub branch: String,
    /// Source repository URL
    pub repository: String,
    /// Ordered server fleet - order matters: migrations run on the last one
    pub servers: Vec<String>,
    /// Login identity used for every SSH session
    pub server_user: String,
    /// Base directory on each server under which deployments live
    pub code_path: PathBuf,
    /// Interpreter used to build the virtualenv inside the checkout
    pub venv_python_path: String,
    /// Django settings module passed to collectstatic and migrate
    pub settings_module: String,

    /// Requirements file relative to the checkout (XOR `pip_command`)
    pub requirements: Option<String>,
    /// Explicit pip install argument (XOR `requirements`)
    pub pip_command: Option<String>,

    #[serde(default = "default_true")]
    pub upgrade_pip: bool,
    #[serde(default = "default_true")]
    pub collectstatic: bool,
    #[serde(default = "default_true")]
    pub migrate: bool,
    #[serde(default)]
    pub selinux: bool,

    /// How many past deployments to keep per server. 0 = never prune.
    #[serde(default)]
    pub save_deploys: u32,

    /// Extra post-cutover commands, run verbatim in declared order
    #[serde(default)]
    pub additional_commands: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// How dependencies get installed into the fresh virtualenv.
///
/// Exactly one of `requirements` / `pip_command` must be configured; the
/// tagged variant replaces key-presence checks against the raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallDirective {
    /// `pip install --ignore-installed -r <path>`
    Requirements(String),
    /// `pip install <spec>`
    Pip(String),
}

impl Instance {
    /// Validates the mutually-exclusive install directive.
    ///
    /// Called before any server is touched; both-present and neither-present
    /// are distinct configuration errors.
    pub fn install_directive(&self, instance_key: &str) -> DeployResult<InstallDirective> {
        match (&self.requirements, &self.pip_command) {
            (Some(req), None) => Ok(InstallDirective::Requirements(req.clone())),
            (None, Some(pip)) => Ok(InstallDirective::Pip(pip.clone())),
            (Some(_), Some(_)) => Err(DeployError::ConflictingInstallDirective {
                instance: instance_key.to_string(),
            }),
            (None, None) => Err(DeployError::MissingInstallDirective {
                instance: instance_key.to_string(),
            }),
        }
    }

}

impl Config {
    /// Load and parse a configuration file.
    ///
    /// An empty or missing `[instances]` table is a configuration error:
    /// there is nothing the tool could deploy.
    pub fn load(path: &Path) -> DeployResult<Config> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if config.instances.is_empty() {
            return Err(DeployError::NoInstances {
                path: path.to_path_buf(),
            });
        }
        Ok(config)
    }

    /// Locate the configuration file per the lookup order.
    pub fn locate(explicit: Option<&Path>) -> DeployResult<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(DeployError::ConfigFileMissing {
                path: path.to_path_buf(),
            });
        }

        let local = PathBuf::from("cutover.toml");
        if local.exists() {
            return Ok(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("cutover").join("config.toml");
            if user.exists() {
                return Ok(user);
            }
        }

        Err(DeployError::ConfigNotFound)
    }

    /// Look up an instance by name; the failure lists all valid names.
    pub fn resolve(&self, name: &str) -> DeployResult<&Instance> {
        self.instances.get(name).ok_or_else(|| {
            let mut valid: Vec<String> = self.instances.keys().cloned().collect();
            valid.sort();
            DeployError::UnknownInstance {
                name: name.to_string(),
                valid,
            }
        })
    }

    /// Instance names in sorted order, for listings.
    pub fn instance_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.instances.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}
