//! Server lifecycle events for real-time state synchronization.
//!
//! These events are emitted by the supervisor and consumed by whatever
//! renders its state. They are the only channel through which the
//! presentation layer learns about lifecycle changes.

use serde::{Deserialize, Serialize};

/// Server lifecycle event payload.
///
/// Every variant carries `at`, Unix time in milliseconds when the event was
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The child was spawned and liveness polling began.
    #[serde(rename_all = "camelCase")]
    Starting {
        pid: Option<u32>,
        port: u16,
        command: String,
        at: i64,
    },

    /// A health check succeeded; the API is reachable.
    #[serde(rename_all = "camelCase")]
    Running {
        port: u16,
        endpoint: String,
        attempts: u32,
        at: i64,
    },

    /// A graceful stop was sent to the child.
    Stopping { pid: Option<u32>, at: i64 },

    /// The child never answered within the configured number of attempts.
    StartupTimedOut { attempts: u32, at: i64 },

    /// The child exited. `code` is `None` when it was killed.
    Exited { code: Option<i32>, at: i64 },
}

impl ServerEvent {
    pub fn starting(pid: Option<u32>, port: u16, command: impl Into<String>) -> Self {
        Self::Starting {
            pid,
            port,
            command: command.into(),
            at: now_ms(),
        }
    }

    pub fn running(port: u16, endpoint: impl Into<String>, attempts: u32) -> Self {
        Self::Running {
            port,
            endpoint: endpoint.into(),
            attempts,
            at: now_ms(),
        }
    }

    pub fn stopping(pid: Option<u32>) -> Self {
        Self::Stopping { pid, at: now_ms() }
    }

    pub fn startup_timed_out(attempts: u32) -> Self {
        Self::StartupTimedOut {
            attempts,
            at: now_ms(),
        }
    }

    pub fn exited(code: Option<i32>) -> Self {
        Self::Exited { code, at: now_ms() }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_event_serialization() {
        let event = ServerEvent::running(9000, "http://127.0.0.1:9000/v1", 3);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"running\""));
        assert!(json.contains("\"endpoint\":\"http://127.0.0.1:9000/v1\""));
        assert!(json.contains("\"attempts\":3"));
    }

    #[test]
    fn startup_timeout_uses_camel_case_tag() {
        let json = serde_json::to_string(&ServerEvent::startup_timed_out(30)).unwrap();
        assert!(json.contains("\"type\":\"startupTimedOut\""));
    }

    #[test]
    fn exit_without_code_serializes_null() {
        let value = serde_json::to_value(ServerEvent::exited(None)).unwrap();
        assert_eq!(value["type"], "exited");
        assert!(value["code"].is_null());
    }
}
