//! Deployment attempt: stamp generation and path derivation
//!
//! A [`DeployPlan`] is constructed once per invocation, after instance
//! resolution and before any remote command, and is immutable thereafter.
//! Derivation is a pure function: identical inputs always yield identical
//! paths. The only durable record of deployment history is the set of
//! stamped directories left on each remote filesystem.

use std::path::PathBuf;

use chrono::Local;

use crate::config::Instance;

/// Format of generated stamps. Sortable: lexicographic order is
/// chronological order, which the retention pruner relies on.
pub const STAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Generate the default stamp from the current local time.
pub fn default_stamp() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

/// Derived names and paths for one deployment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    /// Stamp distinguishing this attempt's directory from prior ones
    pub stamp: String,
    /// Unstamped directory name shared by all attempts of this instance
    pub working_name: String,
    /// `{code_path}/{working_name}-{stamp}` - the fresh checkout
    pub stamped_path: PathBuf,
    /// `{code_path}/{working_name}` - symlink to the active deployment
    pub stable_path: PathBuf,
}

impl DeployPlan {
    /// Derive the working name and both paths for a deployment attempt.
    ///
    /// `template` supports the placeholders `{name}`, `{instance}`,
    /// `{branch}` and `{server_user}`; the stamp is always appended after
    /// the template so the stable path stays stamp-free.
    pub fn derive(instance_key: &str, instance: &Instance, stamp: &str, template: &str) -> Self {
        let working_name = template
            .replace("{name}", &instance.name)
            .replace("{instance}", instance_key)
            .replace("{branch}", &instance.branch)
            .replace("{server_user}", &instance.server_user);

        let stamped_path = instance
            .code_path
            .join(format!("{working_name}-{stamp}"));
        let stable_path = instance.code_path.join(&working_name);

        Self {
            stamp: stamp.to_string(),
            working_name,
            stamped_path,
            stable_path,
        }
    }
}
