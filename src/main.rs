//! cutover CLI - phased multi-server SSH deployment tool
//!
//! Usage: cutover <COMMAND>
//!
//! Commands:
//!   deploy     Deploy an instance to its server fleet
//!   instances  List configured instances

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use cutover::confirm::{confirm_deploy, Verdict};
use cutover::{default_stamp, Config, ConsoleReporter, DeployPlan, Deployer, SshExecutor};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy {
            instance,
            config,
            quiet,
            no_confirm,
            stamp,
        } => cmd_deploy(&instance, config.as_deref(), quiet, no_confirm, stamp),
        Commands::Instances { config } => cmd_instances(config.as_deref()),
    }
}

fn cmd_deploy(
    instance_key: &str,
    config_path: Option<&Path>,
    quiet: bool,
    no_confirm: bool,
    stamp: Option<String>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let instance = config.resolve(instance_key)?;

    // Surface a contradictory install directive before prompting or
    // touching the network.
    instance.install_directive(instance_key)?;

    if confirm_deploy(instance_key, &instance.servers, no_confirm)? == Verdict::Declined {
        println!("You did not type 'yes' - aborting.");
        return Ok(());
    }

    let stamp = stamp.unwrap_or_else(default_stamp);
    let plan = DeployPlan::derive(instance_key, instance, &stamp, &config.clone_dir_format);

    let deployer = Deployer::new(SshExecutor::new());
    let mut reporter = ConsoleReporter::new(quiet);

    match deployer.run(instance_key, instance, &plan, &mut reporter) {
        Ok(_report) => {
            println!("All done!");
            Ok(())
        }
        Err(err) => {
            if let Some(hint) = err.hint() {
                eprintln!("{hint}");
            }
            Err(err.into())
        }
    }
}

fn cmd_instances(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    for key in config.instance_names() {
        let instance = &config.instances[key];
        println!(
            "{key}: {} ({}), {} server(s)",
            instance.name,
            instance.branch,
            instance.servers.len()
        );
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path: PathBuf = Config::locate(explicit)?;
    Ok(Config::load(&path)?)
}
