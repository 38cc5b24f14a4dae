//! Two-phase rollout orchestrator
//!
//! Drives two ordered, sequential passes over the instance's server list:
//!
//! 1. **Provision**: clone the repository into the stamped path, build the
//!    virtualenv, install dependencies, stage static assets.
//! 2. **Cutover**: repoint the stable symlink, prune retired deployments,
//!    run additional commands, and migrate - last server only, exactly once.
//!
//! Cutover never starts until every server has a verified-good build. The
//! first non-zero exit status anywhere aborts the entire run; partially
//! provisioned stamped directories are left in place for inspection. The
//! fleet can end up mixed (some servers provisioned, some not) but the
//! orchestrator never knowingly continues past a detected failure.

use std::fmt;

use crate::config::{InstallDirective, Instance};
use crate::error::{DeployError, DeployResult};
use crate::executor::{RemoteExecutor, RemoteSession};
use crate::plan::DeployPlan;
use crate::prune;
use crate::report::Reporter;
use crate::script;

/// The two ordered passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Provision,
    Cutover,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Provision => write!(f, "provision"),
            Phase::Cutover => write!(f, "cutover"),
        }
    }
}

/// Per (server, phase) progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    NotStarted,
    Connected,
    CommandIssued,
    Succeeded,
    Failed,
}

/// Terminal record for one server in one phase.
#[derive(Debug, Clone)]
pub struct ServerPhase {
    pub server: String,
    pub phase: Phase,
    pub state: StepState,
}

/// Structured result of a completed run.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub phases: Vec<ServerPhase>,
    /// Server the migration hook ran on, if it ran.
    pub migrated_on: Option<String>,
}

impl DeployReport {
    fn begin(&mut self, server: &str, phase: Phase) -> usize {
        self.phases.push(ServerPhase {
            server: server.to_string(),
            phase,
            state: StepState::NotStarted,
        });
        self.phases.len() - 1
    }

    fn mark(&mut self, idx: usize, state: StepState) {
        self.phases[idx].state = state;
    }

    /// Terminal state for one server in one phase.
    pub fn state_of(&self, server: &str, phase: Phase) -> Option<StepState> {
        self.phases
            .iter()
            .find(|p| p.server == server && p.phase == phase)
            .map(|p| p.state)
    }
}

/// The phase orchestrator. Owns the executor; the deployment attempt and
/// all per-server execution state flow through [`Deployer::run`].
pub struct Deployer<E> {
    executor: E,
}

impl<E: RemoteExecutor> Deployer<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Run both phases across the fleet.
    ///
    /// The install directive is validated up front, before any connection
    /// is opened. Any connection failure or non-zero exit status aborts the
    /// run; no automatic retry, no cleanup.
    pub fn run(
        &self,
        instance_key: &str,
        instance: &Instance,
        plan: &DeployPlan,
        reporter: &mut dyn Reporter,
    ) -> DeployResult<DeployReport> {
        let directive = instance.install_directive(instance_key)?;

        let mut report = DeployReport::default();

        for server in &instance.servers {
            self.provision(server, instance, plan, &directive, reporter, &mut report)?;
        }

        let fleet_size = instance.servers.len();
        for (index, server) in instance.servers.iter().enumerate() {
            let last = index + 1 == fleet_size;
            self.cut_over(server, last, instance, plan, reporter, &mut report)?;
        }

        Ok(report)
    }

    /// Phase 1 on one server: build a complete, not-yet-active deployment.
    fn provision(
        &self,
        server: &str,
        instance: &Instance,
        plan: &DeployPlan,
        directive: &InstallDirective,
        reporter: &mut dyn Reporter,
        report: &mut DeployReport,
    ) -> DeployResult<()> {
        let idx = report.begin(server, Phase::Provision);
        let mut session = self.executor.connect(server, &instance.server_user)?;
        report.mark(idx, StepState::Connected);

        reporter.progress(&format!(
            "Cloning code and preparing venv on node: {server}..."
        ));

        run_step(
            &mut session,
            reporter,
            report,
            idx,
            "mkdir",
            &script::ensure_base_dir(&instance.code_path),
        )?;

        let stamped_dir = format!("{}-{}", plan.working_name, plan.stamp);
        run_step(
            &mut session,
            reporter,
            report,
            idx,
            "git",
            &script::clone_repository(
                &instance.code_path,
                &instance.branch,
                &instance.repository,
                &stamped_dir,
            ),
        )?;

        reporter.progress("Preparing the installation...");

        run_step(
            &mut session,
            reporter,
            report,
            idx,
            "venv",
            &script::create_venv(&plan.stamped_path, &instance.venv_python_path),
        )?;

        if instance.upgrade_pip {
            run_step(
                &mut session,
                reporter,
                report,
                idx,
                "pip",
                &script::upgrade_pip(&plan.stamped_path),
            )?;
        } else {
            reporter.progress("pip will NOT be upgraded.");
        }

        run_step(
            &mut session,
            reporter,
            report,
            idx,
            "pip",
            &script::install_dependencies(&plan.stamped_path, directive),
        )?;

        if instance.collectstatic {
            run_step(
                &mut session,
                reporter,
                report,
                idx,
                "collectstatic",
                &script::collect_static(&plan.stamped_path, &instance.settings_module),
            )?;
        } else {
            reporter.progress("Static files will NOT be collected.");
        }

        if instance.selinux {
            reporter.progress("Setting security context for RedHat / CentOS SELinux...");
            run_step(
                &mut session,
                reporter,
                report,
                idx,
                "chcon",
                &script::selinux_relabel(&plan.stamped_path),
            )?;
        }

        Ok(())
    }

    /// Phase 2 on one server: activate the new deployment.
    fn cut_over(
        &self,
        server: &str,
        last: bool,
        instance: &Instance,
        plan: &DeployPlan,
        reporter: &mut dyn Reporter,
        report: &mut DeployReport,
    ) -> DeployResult<()> {
        let idx = report.begin(server, Phase::Cutover);
        let mut session = self.executor.connect(server, &instance.server_user)?;
        report.mark(idx, StepState::Connected);

        reporter.progress(&format!(
            "Updating symlinks and running any additional defined commands on node: {server}..."
        ));

        run_step(
            &mut session,
            reporter,
            report,
            idx,
            "ln",
            &script::repoint_symlink(&plan.stamped_path, &plan.stable_path),
        )?;

        if instance.save_deploys > 0 {
            reporter.progress(&format!(
                "Keeping the {} most recent deployments, and deleting the rest on node: {server}",
                instance.save_deploys
            ));
            self.prune_server(&mut session, instance, plan, reporter, report, idx)?;
        }

        if !instance.additional_commands.is_empty() {
            reporter.progress("Performing defined additional commands...");
            for command in &instance.additional_commands {
                reporter.progress(&format!("Running '{command}'..."));
                run_step(&mut session, reporter, report, idx, command, command)?;
            }
        }

        if last && instance.migrate {
            reporter.progress("Finally, running migrations...");
            run_step(
                &mut session,
                reporter,
                report,
                idx,
                "migrate",
                &script::run_migrations(&plan.stamped_path, &instance.settings_module),
            )?;
            report.migrated_on = Some(server.to_string());
        }

        Ok(())
    }

    /// List stamped siblings, pick the surplus locally, delete oldest-first.
    fn prune_server<S: RemoteSession>(
        &self,
        session: &mut S,
        instance: &Instance,
        plan: &DeployPlan,
        reporter: &mut dyn Reporter,
        report: &mut DeployReport,
        idx: usize,
    ) -> DeployResult<()> {
        report.mark(idx, StepState::CommandIssued);
        let listing = session.run(&script::list_deployments(&plan.stable_path))?;
        reporter.command_output(&listing);
        if !listing.success() {
            report.mark(idx, StepState::Failed);
            return Err(DeployError::RemoteCommand {
                command: "ls".to_string(),
                exit_status: listing.exit_status,
            });
        }
        report.mark(idx, StepState::Succeeded);

        // The just-activated deployment reserves one slot.
        let keep_total = instance.save_deploys as usize + 1;
        for victim in prune::select_victims(&listing.stdout, plan, keep_total) {
            run_step(
                session,
                reporter,
                report,
                idx,
                "rm",
                &script::remove_deployment(&victim),
            )?;
        }

        Ok(())
    }
}

/// Issue one command, surface its output, and enforce the exit status.
fn run_step<S: RemoteSession>(
    session: &mut S,
    reporter: &mut dyn Reporter,
    report: &mut DeployReport,
    idx: usize,
    label: &str,
    command: &str,
) -> DeployResult<()> {
    report.mark(idx, StepState::CommandIssued);
    let output = session.run(command)?;
    reporter.command_output(&output);

    if output.success() {
        report.mark(idx, StepState::Succeeded);
        Ok(())
    } else {
        report.mark(idx, StepState::Failed);
        Err(DeployError::RemoteCommand {
            command: label.to_string(),
            exit_status: output.exit_status,
        })
    }
}
