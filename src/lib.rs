//! cutover - phased multi-server SSH deployment tool
//!
//! cutover provisions a fresh, timestamped copy of an application on every
//! server of a named instance, atomically repoints the stable symlink to it,
//! prunes old deployments, and runs post-cutover hooks (database migration)
//! exactly once, on the last server in the declared order.

pub mod config;
pub mod confirm;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod plan;
pub mod prune;
pub mod report;
pub mod script;

// Re-exports for convenience
pub use config::{Config, InstallDirective, Instance};
pub use confirm::{confirm_deploy, Verdict};
pub use error::{DeployError, DeployResult};
pub use executor::{ExecOutput, RemoteExecutor, RemoteSession, SshExecutor};
pub use orchestrator::{DeployReport, Deployer, Phase, StepState};
pub use plan::{default_stamp, DeployPlan};
pub use report::{ConsoleReporter, Reporter};
