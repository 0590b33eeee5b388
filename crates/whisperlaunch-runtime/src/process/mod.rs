//! Process management for the transcription server.
//!
//! # Structure
//!
//! - `ProcessSupervisor` - Owns the child and its state machine
//! - `spawn_pipe_reader` - Output relay from the child's combined stdout/stderr pipe
//! - `ServerEventBroadcaster` - Lifecycle event fan-out
//! - `ServerLogManager` - Bounded output buffer with live subscription
//! - `shutdown` - Graceful terminate signal

mod broadcaster;
mod error;
mod logs;
mod shutdown;
mod stream;
mod supervisor;

// Re-export commonly used types
pub use broadcaster::ServerEventBroadcaster;
pub use error::{FileKind, SupervisorError};
pub use logs::{ServerLogEntry, ServerLogManager};
pub use shutdown::request_terminate;
pub use stream::{OutputLine, decode_line, spawn_stream_reader};
pub use supervisor::{ProcessSupervisor, SupervisorOptions, verify_launch_files};
