//! Command-line launcher for a local whisper-server.
//!
//! `main.rs` is the composition root; this library holds the argument
//! definitions, handlers and terminal rendering so they can be tested.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap, bootstrap_at};
pub use commands::{Commands, LaunchOverrides, RunArgs};
pub use config_commands::ConfigCommand;
pub use error::CliError;
pub use parser::Cli;
