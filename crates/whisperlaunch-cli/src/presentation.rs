//! Terminal rendering of server events and output lines.

use serde_json::json;
use whisperlaunch_core::{OutputStream, ServerEvent, ServerState};
use whisperlaunch_runtime::ServerLogEntry;

/// Human-readable status line for a lifecycle event.
pub fn event_message(event: &ServerEvent) -> String {
    match event {
        ServerEvent::Starting { pid, port, .. } => match pid {
            Some(pid) => format!("Starting whisper-server (pid {pid}) on port {port}..."),
            None => format!("Starting whisper-server on port {port}..."),
        },
        ServerEvent::Running { endpoint, .. } => format!(
            "✓ Server {}\n  Endpoint: {endpoint}",
            ServerState::Running
        ),
        ServerEvent::Stopping { .. } => "Stopping server...".to_string(),
        ServerEvent::StartupTimedOut { attempts, .. } => {
            format!("✗ Server did not answer after {attempts} health checks, killing it")
        }
        ServerEvent::Exited { code, .. } => {
            format!("Server {}", ServerState::Exited { code: *code })
        }
    }
}

/// Output line as shown in the terminal. Server lines are printed verbatim.
pub fn log_line(entry: &ServerLogEntry) -> String {
    match entry.stream {
        OutputStream::Server => entry.line.clone(),
        OutputStream::System => format!("> {}", entry.line),
    }
}

/// One JSON document per event, tagged by `type`.
pub fn event_json(event: &ServerEvent) -> String {
    serde_json::to_string(event)
        .unwrap_or_else(|e| json!({ "type": "error", "message": e.to_string() }).to_string())
}

/// One JSON document per output line, tagged `"type": "output"`.
pub fn log_json(entry: &ServerLogEntry) -> String {
    json!({
        "type": "output",
        "stream": entry.stream,
        "line": entry.line,
        "at": entry.timestamp,
    })
    .to_string()
}
