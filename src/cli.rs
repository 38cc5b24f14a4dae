use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cutover - phased multi-server SSH deployment tool
#[derive(Parser, Debug)]
#[command(name = "cutover")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy an instance to its server fleet. BE CAREFUL!
    Deploy {
        /// The configured instance to deploy
        #[arg(short, long)]
        instance: String,

        /// Path to the configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Minimal output (errors are always shown)
        #[arg(short, long)]
        quiet: bool,

        /// Deploy without confirmation: be careful!
        #[arg(long)]
        no_confirm: bool,

        /// Override the generated deployment timestamp
        #[arg(long)]
        stamp: Option<String>,
    },

    /// List configured instances
    Instances {
        /// Path to the configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
