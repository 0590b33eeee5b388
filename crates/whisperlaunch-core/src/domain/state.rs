//! Server lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed state of the supervised server.
///
/// `Stopped` is the state before anything was launched; `Exited` carries the
/// exit code of the last child (`None` when it was killed by a signal or the
/// OS did not report one). Both count as stopped for `start` purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ServerState {
    /// Nothing has been launched yet.
    #[default]
    Stopped,
    /// The child is running but has not answered a health check yet.
    Starting,
    /// The child answered a health check.
    Running,
    /// A graceful stop was requested and the child has not exited yet.
    Stopping,
    /// The child exited.
    Exited {
        /// Raw exit code, if the OS reported one.
        code: Option<i32>,
    },
}

impl ServerState {
    /// No child is owned; `start` is allowed.
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped | Self::Exited { .. })
    }

    /// `stop` is allowed.
    pub const fn can_stop(&self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// Exit code of the last child, if it has exited.
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited { code } => *code,
            _ => None,
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped | Self::Exited { code: Some(0) } => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running (OpenAI compatible API ready)"),
            Self::Stopping => write!(f, "stopping"),
            Self::Exited { code: Some(code) } => write!(f, "stopped (exit code {code})"),
            Self::Exited { code: None } => write!(f, "stopped (killed, no exit code)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_and_exited_allow_start() {
        assert!(ServerState::Stopped.is_stopped());
        assert!(ServerState::Exited { code: Some(1) }.is_stopped());
        assert!(ServerState::Exited { code: None }.is_stopped());
        assert!(!ServerState::Starting.is_stopped());
        assert!(!ServerState::Running.is_stopped());
        assert!(!ServerState::Stopping.is_stopped());
    }

    #[test]
    fn only_starting_and_running_can_stop() {
        assert!(ServerState::Starting.can_stop());
        assert!(ServerState::Running.can_stop());
        assert!(!ServerState::Stopping.can_stop());
        assert!(!ServerState::Stopped.can_stop());
    }

    #[test]
    fn display_includes_nonzero_exit_code() {
        assert_eq!(ServerState::Exited { code: Some(0) }.to_string(), "stopped");
        assert_eq!(
            ServerState::Exited { code: Some(3) }.to_string(),
            "stopped (exit code 3)"
        );
        assert!(ServerState::Exited { code: None }.to_string().contains("killed"));
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_string(&ServerState::Exited { code: Some(2) }).unwrap();
        assert_eq!(json, r#"{"status":"exited","code":2}"#);
    }
}
