//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the whisper-server launcher.
///
/// Without a subcommand the server is started only when `autoStart` is set
/// in the configuration; otherwise help is printed.
#[derive(Parser)]
#[command(name = "whisperlaunch")]
#[command(about = "Launch and supervise a local whisper-server with an OpenAI compatible API")]
#[command(version)]
pub struct Cli {
    /// Use this configuration file instead of the default location
    #[arg(long = "config", global = true, env = "WHISPERLAUNCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
