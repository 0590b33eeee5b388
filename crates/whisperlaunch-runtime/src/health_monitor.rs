//! Startup liveness polling.
//!
//! The server prints nothing machine-readable when it finishes loading, so
//! readiness is detected by polling its HTTP root until it answers. The
//! monitor is policy-free: it reports what it saw and leaves state changes
//! to the supervisor.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use whisperlaunch_core::ports::{HealthProbe, ProbeOutcome};

/// Delay between polling attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How a polling run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessOutcome {
    /// A probe returned a 2xx status on the given attempt.
    Ready { attempts: u32 },
    /// `max_attempts` probes failed.
    TimedOut { attempts: u32 },
    /// Polling was cancelled, normally because the process exited.
    Cancelled { attempts: u32 },
}

/// Polls a health URL on a fixed interval until it succeeds.
#[derive(Debug, Clone, Copy)]
pub struct LivenessMonitor {
    interval: Duration,
    max_attempts: Option<u32>,
}

impl LivenessMonitor {
    /// `max_attempts = None` polls until success or cancellation.
    pub const fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Poll `url` until it is healthy, attempts run out, or `cancel` fires.
    ///
    /// The first attempt is made immediately. Failed attempts are expected
    /// while the model loads and are only logged at debug level.
    pub async fn wait_until_ready(
        &self,
        probe: &dyn HealthProbe,
        url: &str,
        cancel: &CancellationToken,
    ) -> LivenessOutcome {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut attempts = 0;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return LivenessOutcome::Cancelled { attempts },
                _ = ticker.tick() => {}
            }

            if self.max_attempts.is_some_and(|max| attempts >= max) {
                debug!(url, attempts, "liveness polling gave up");
                return LivenessOutcome::TimedOut { attempts };
            }

            attempts += 1;
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return LivenessOutcome::Cancelled { attempts },
                outcome = probe.probe(url) => outcome,
            };

            match outcome {
                ProbeOutcome::Healthy => {
                    debug!(url, attempts, "server answered health check");
                    return LivenessOutcome::Ready { attempts };
                }
                ProbeOutcome::BadStatus { status } => {
                    debug!(
                        url,
                        attempts,
                        status,
                        "health check returned non-success status, retrying"
                    );
                }
                ProbeOutcome::Unreachable { last_error } => {
                    debug!(url, attempts, %last_error, "server not reachable yet, retrying");
                }
            }
        }
    }
}

impl Default for LivenessMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, None)
    }
}
