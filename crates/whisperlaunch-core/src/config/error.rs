//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving the launcher configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not determine where configuration lives.
    #[error("Cannot determine configuration directory")]
    NoConfigDir,

    /// The configuration file exists but could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be written.
    #[error("Failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be encoded.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}
