//! Remote execution client
//!
//! The orchestrator only sees the [`RemoteExecutor`] / [`RemoteSession`]
//! contract: open a session to one server identity, run opaque command
//! strings, get back captured output and an exit status. The production
//! implementation shells out to the `ssh` binary; tests use a recording
//! mock.
//!
//! Sessions are opened per server per phase - no pooling. Establishing a
//! session is a distinct step so connection failures are reported as
//! [`DeployError::Connection`], not as a failing command.

use std::process::{Command, Stdio};

use crate::error::{DeployError, DeployResult};

/// Captured result of one remote command.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// One established session to a single server.
pub trait RemoteSession {
    /// Run an opaque command string, blocking until its exit status is known.
    fn run(&mut self, command: &str) -> DeployResult<ExecOutput>;
}

/// Factory for per-server sessions.
pub trait RemoteExecutor {
    type Session: RemoteSession;

    /// Open a session to `server` as `user`. Failure here is fatal to the
    /// whole run: a partially reachable fleet cannot be deployed
    /// consistently.
    fn connect(&self, server: &str, user: &str) -> DeployResult<Self::Session>;
}

/// Production executor backed by the system `ssh` binary.
pub struct SshExecutor;

impl SshExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SshExecutor {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SshSession {
    destination: String,
}

impl SshSession {
    fn exec(&self, command: &str) -> std::io::Result<ExecOutput> {
        // BatchMode keeps a broken connection from hanging on a password
        // prompt mid-deploy.
        let output = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(&self.destination)
            .arg(command)
            .stdin(Stdio::null())
            .output()?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_status: output.status.code().unwrap_or(-1),
        })
    }
}

impl RemoteExecutor for SshExecutor {
    type Session = SshSession;

    fn connect(&self, server: &str, user: &str) -> DeployResult<SshSession> {
        let session = SshSession {
            destination: format!("{user}@{server}"),
        };

        // Probe with a no-op so transport-level failures surface here
        // rather than as a failing deployment step.
        let probe = session.exec("true").map_err(|e| DeployError::Connection {
            server: server.to_string(),
            user: user.to_string(),
            detail: e.to_string(),
        })?;

        // ssh reserves exit status 255 for its own transport failures; a
        // failing `true` can only mean the session itself is unusable.
        if !probe.success() {
            return Err(DeployError::Connection {
                server: server.to_string(),
                user: user.to_string(),
                detail: probe.stderr.trim().to_string(),
            });
        }

        Ok(session)
    }
}

impl RemoteSession for SshSession {
    fn run(&mut self, command: &str) -> DeployResult<ExecOutput> {
        Ok(self.exec(command)?)
    }
}
