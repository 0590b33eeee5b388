//! HTTP health checks for the transcription server.
//!
//! whisper-server has no dedicated health route; its root page answers as
//! soon as the model is loaded, so any 2xx on `/` counts as healthy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use whisperlaunch_core::ports::{HealthProbe, ProbeOutcome};

/// Per-attempt timeout. Kept under the poll interval so attempts never overlap.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(800);

/// Health probe backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: Client,
}

impl HttpHealthProbe {
    /// Create a probe whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        // The server is always local; system proxy settings must not apply
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self { client })
    }

    /// Probe with [`DEFAULT_PROBE_TIMEOUT`].
    pub fn with_default_timeout() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::Healthy,
            Ok(response) => ProbeOutcome::BadStatus {
                status: response.status().as_u16(),
            },
            Err(e) if e.is_timeout() => ProbeOutcome::Unreachable {
                last_error: "Health check timeout".to_string(),
            },
            Err(e) if e.is_connect() => ProbeOutcome::Unreachable {
                last_error: "Connection refused".to_string(),
            },
            Err(e) => {
                debug!(url, error = %e, "health check failed");
                ProbeOutcome::Unreachable {
                    last_error: format!("Health check failed: {e}"),
                }
            }
        }
    }
}

/// Single health check against `http://127.0.0.1:{port}/`.
pub async fn check_http_health(port: u16) -> Result<bool, reqwest::Error> {
    let probe = HttpHealthProbe::with_default_timeout()?;
    let url = format!("http://{}:{port}/", whisperlaunch_core::LOCAL_HOST);
    Ok(probe.probe(&url).await.is_healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `response` to every connection on an ephemeral port.
    async fn serve_fixed(response: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        port
    }

    async fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn ok_response_is_healthy() {
        let port =
            serve_fixed("HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                .await;
        let probe = HttpHealthProbe::with_default_timeout().unwrap();
        let outcome = probe.probe(&format!("http://127.0.0.1:{port}/")).await;
        assert_eq!(outcome, ProbeOutcome::Healthy);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let port = serve_fixed(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let probe = HttpHealthProbe::with_default_timeout().unwrap();
        let outcome = probe.probe(&format!("http://127.0.0.1:{port}/")).await;
        assert_eq!(outcome, ProbeOutcome::BadStatus { status: 503 });
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let port = unused_port().await;
        let probe = HttpHealthProbe::with_default_timeout().unwrap();
        let outcome = probe.probe(&format!("http://127.0.0.1:{port}/")).await;
        assert!(matches!(outcome, ProbeOutcome::Unreachable { .. }));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept and hold the connection without answering
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let probe = HttpHealthProbe::new(Duration::from_millis(100)).unwrap();
        let outcome = probe.probe(&format!("http://127.0.0.1:{port}/")).await;
        assert_eq!(
            outcome,
            ProbeOutcome::Unreachable {
                last_error: "Health check timeout".to_string()
            }
        );
    }

    #[tokio::test]
    async fn check_http_health_on_closed_port_is_false() {
        let port = unused_port().await;
        assert!(!check_http_health(port).await.unwrap());
    }
}
