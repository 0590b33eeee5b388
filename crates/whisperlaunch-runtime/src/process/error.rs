//! Supervisor error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use whisperlaunch_core::{PathError, ServerState};

/// Which launch input a [`SupervisorError::MissingFile`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Executable,
    Model,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executable => f.write_str("server executable"),
            Self::Model => f.write_str("model file"),
        }
    }
}

/// Errors returned by supervisor operations.
///
/// None of these leave a child process behind: every variant is produced
/// either before spawning or when spawning itself failed.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The executable or model does not exist.
    #[error("{kind} not found: {}", .path.display())]
    MissingFile { kind: FileKind, path: PathBuf },

    /// The model argument could not be derived (e.g. non-ASCII path).
    #[error(transparent)]
    Path(#[from] PathError),

    /// The OS refused to create the process.
    #[error("Failed to start {}: {source}", .path.display())]
    SpawnFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `start` while a child is still owned.
    #[error("Server is already {state}; stop it first")]
    AlreadyRunning { state: ServerState },

    /// `stop`/`kill` with nothing to stop.
    #[error("Server is not running ({state})")]
    NotRunning { state: ServerState },
}

impl SupervisorError {
    /// Whether the error comes from a check that runs before spawning.
    pub const fn is_preventable(&self) -> bool {
        matches!(self, Self::MissingFile { .. } | Self::Path(_))
    }
}
