//! Health probe port used by liveness polling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a single health check attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ProbeOutcome {
    /// The server answered with a 2xx status.
    Healthy,
    /// The server answered, but not with a 2xx status.
    #[serde(rename_all = "camelCase")]
    BadStatus { status: u16 },
    /// No answer: connection refused, timeout, or another transport error.
    #[serde(rename_all = "camelCase")]
    Unreachable { last_error: String },
}

impl ProbeOutcome {
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Single-shot health check.
///
/// Implementations must bound each attempt by their own timeout and report
/// failures as outcomes rather than errors; failing checks are expected
/// while the server loads its model.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}
