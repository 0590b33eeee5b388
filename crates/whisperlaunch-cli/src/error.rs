//! CLI-specific error types and mappings.
//!
//! Library errors are converted into `CliError` at the handler boundary so
//! `main` can pick a process exit code without knowing the library types.

use thiserror::Error;
use whisperlaunch_core::{ConfigError, PathError};
use whisperlaunch_runtime::SupervisorError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument parsing or validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// An input file (server binary or model) is missing.
    #[error("{0}")]
    MissingInput(String),

    /// The model path cannot be handed to the server.
    #[error("{0}")]
    UnsupportedPath(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process creation or signalling error.
    #[error("Process error: {0}")]
    Process(String),

    /// The server never answered health checks.
    #[error("Server did not become ready after {attempts} health checks")]
    StartupTimedOut { attempts: u32 },

    /// The server exited without being asked to.
    #[error("Server exited unexpectedly ({})", describe_code(.code))]
    ServerExited { code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(
        || "killed, no exit code".to_string(),
        |code| format!("exit code {code}"),
    )
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,        // EX_USAGE
            Self::MissingInput(_) => 66,    // EX_NOINPUT
            Self::UnsupportedPath(_) => 65, // EX_DATAERR
            Self::Io(_) => 74,              // EX_IOERR
            Self::Config(_) => 78,          // EX_CONFIG
            Self::Process(_) => 71,         // EX_OSERR
            Self::StartupTimedOut { .. } => 69, // EX_UNAVAILABLE
            Self::ServerExited { code } => match code {
                Some(code) if *code > 0 && *code < 256 => *code,
                _ => 1,
            },
        }
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::MissingFile { .. } => Self::MissingInput(err.to_string()),
            SupervisorError::Path(path_err) => path_err.into(),
            SupervisorError::SpawnFailure { .. }
            | SupervisorError::AlreadyRunning { .. }
            | SupervisorError::NotRunning { .. } => Self::Process(err.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::UnsupportedPathEncoding { .. } => Self::UnsupportedPath(err.to_string()),
            PathError::NotAbsolute(_) | PathError::NoParentDirectory(_) => {
                Self::Arguments(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use whisperlaunch_runtime::FileKind;

    #[test]
    fn missing_model_maps_to_noinput() {
        let err = CliError::from(SupervisorError::MissingFile {
            kind: FileKind::Model,
            path: PathBuf::from("/models/m.bin"),
        });
        assert_eq!(err.exit_code(), 66);
        assert_eq!(err.to_string(), "model file not found: /models/m.bin");
    }

    #[test]
    fn non_ascii_path_maps_to_dataerr() {
        let err = CliError::from(SupervisorError::from(PathError::UnsupportedPathEncoding {
            path: "../models/モデル.bin".to_string(),
        }));
        assert!(matches!(err, CliError::UnsupportedPath(_)));
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn server_exit_code_is_forwarded() {
        assert_eq!(CliError::ServerExited { code: Some(3) }.exit_code(), 3);
        assert_eq!(CliError::ServerExited { code: None }.exit_code(), 1);
        assert_eq!(CliError::ServerExited { code: Some(-1) }.exit_code(), 1);
    }

    #[test]
    fn server_exit_message_mentions_kill() {
        let err = CliError::ServerExited { code: None };
        assert_eq!(err.to_string(), "Server exited unexpectedly (killed, no exit code)");
    }
}
