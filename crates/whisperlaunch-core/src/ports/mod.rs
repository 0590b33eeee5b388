//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod health_probe;
pub mod server_log_sink;

pub use health_probe::{HealthProbe, ProbeOutcome};
pub use server_log_sink::{NoopLogSink, OutputStream, ServerLogSinkPort};
