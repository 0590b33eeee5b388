//! Configuration management subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Configuration management commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Print the configuration as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update saved settings (only the given fields change)
    Set {
        /// Server executable
        #[arg(long = "exe", value_name = "PATH")]
        executable: Option<PathBuf>,
        /// Model file
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
        /// Port the server listens on
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
        /// Start the server when whisperlaunch is invoked without a command
        #[arg(long, value_name = "BOOL")]
        auto_start: Option<bool>,
    },
    /// Restore the default configuration
    Reset,
}
