//! Server log sink port for output capture.
//!
//! This port abstracts the destination for server output so the CLI can
//! print lines while other front ends buffer or stream them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    /// The child's combined stdout and stderr.
    Server,
    /// Lines produced by the supervisor itself (e.g. the launched command).
    System,
}

impl OutputStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::System => "system",
        }
    }
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port for appending server output lines to a sink.
///
/// Lines arrive in the order the supervisor received them. Implementations
/// must not block; they are called from the supervisor's control task.
pub trait ServerLogSinkPort: Send + Sync {
    /// Append one decoded line (without trailing newline).
    fn append(&self, stream: OutputStream, line: String);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl ServerLogSinkPort for NoopLogSink {
    fn append(&self, _stream: OutputStream, _line: String) {}
}
