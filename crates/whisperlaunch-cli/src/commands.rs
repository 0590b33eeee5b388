//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config_commands::ConfigCommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start whisper-server and supervise it until it exits or Ctrl+C
    Run(RunArgs),

    /// Validate the launch configuration without starting anything
    Check(LaunchOverrides),

    /// View or change the saved launcher configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Show resolved paths (config file, default executable and model)
    Paths,
}

/// Per-invocation overrides of the saved configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct LaunchOverrides {
    /// Server executable (defaults to the saved or discovered one)
    #[arg(long = "exe", value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Model file passed with -m
    #[arg(short, long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Port the server listens on
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
}

/// Arguments for `run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: LaunchOverrides,

    /// Give up if the server is not ready after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u32).range(1..))]
    pub startup_timeout: Option<u32>,

    /// Print lifecycle events and output lines as JSON, one per line
    #[arg(long)]
    pub json_events: bool,

    /// Do not write the effective settings back to the configuration file
    #[arg(long)]
    pub no_save: bool,
}
