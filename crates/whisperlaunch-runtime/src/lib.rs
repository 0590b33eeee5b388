//! Process runtime for whisperlaunch.
//!
//! Owns the whisper-server child process: spawning it, relaying its output,
//! polling it until it serves HTTP, and stopping it again.

#![deny(unsafe_code)]

mod health;
pub mod health_monitor;
pub mod process;

// Re-export the HTTP probe used in production
pub use health::{DEFAULT_PROBE_TIMEOUT, HttpHealthProbe, check_http_health};

// Re-export liveness polling primitives
pub use health_monitor::{DEFAULT_POLL_INTERVAL, LivenessMonitor, LivenessOutcome};

// Re-export supervision types
pub use process::{
    FileKind, OutputLine, ProcessSupervisor, ServerEventBroadcaster, ServerLogEntry,
    ServerLogManager, SupervisorError, SupervisorOptions, verify_launch_files,
};
