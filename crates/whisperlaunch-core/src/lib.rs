//! Core domain types and port definitions for whisperlaunch.
//!
//! This crate has no process or network code. It defines:
//! - Path resolution for the child's model argument (`paths`)
//! - The launch description and server state machine values (`domain`)
//! - Lifecycle events consumed by presentation layers (`events`)
//! - Port traits implemented by the runtime (`ports`)
//! - Persisted launcher configuration (`config`)

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigStore, JsonConfigStore, LauncherConfig};
pub use domain::{
    DEFAULT_PORT, INFERENCE_PATH, LOCAL_HOST, LaunchSpec, ServerState,
};
pub use events::ServerEvent;
pub use paths::{PathError, ResolvedModelArg, resolve_model_arg};
pub use ports::{HealthProbe, NoopLogSink, OutputStream, ProbeOutcome, ServerLogSinkPort};
