use std::time::Duration;

use reqwest::Url;
use tokio::time::Instant;
use tracing::debug;

use super::outcome::RequestOutcome;
use super::transport::{Transport, TransportFailure};

/// Performs one request and classifies the result. Never returns an error:
/// every failure mode becomes a [`RequestOutcome`].
#[derive(Debug)]
pub struct RequestExecutor<T> {
    transport: T,
    expected_status_code: u16,
}

impl<T> RequestExecutor<T>
where
    T: Transport,
{
    #[must_use]
    pub const fn new(transport: T, expected_status_code: u16) -> Self {
        Self {
            transport,
            expected_status_code,
        }
    }

    /// Issues a GET against `target` for `slot`. The whole call, including
    /// the transport's own handling, is bounded by `timeout`.
    pub async fn execute(&self, slot: u64, target: &Url, timeout: Duration) -> RequestOutcome {
        let start = Instant::now();
        let result = tokio::time::timeout(timeout, self.transport.get(target, timeout)).await;
        let latency = start.elapsed();

        match result {
            Err(_) | Ok(Err(TransportFailure::Timeout)) => {
                debug!("Request {} timed out after {:?}", slot, latency);
                RequestOutcome::timeout(slot, latency)
            }
            Ok(Err(TransportFailure::Transport(message))) => {
                debug!("Request {} failed: {}", slot, message);
                RequestOutcome::transport_error(slot, latency)
            }
            Ok(Ok(status)) if status == self.expected_status_code => {
                RequestOutcome::success(slot, status, latency)
            }
            Ok(Ok(status)) => {
                debug!(
                    "Request {} returned status {} (expected {})",
                    slot, status, self.expected_status_code
                );
                RequestOutcome::unexpected_status(slot, status, latency)
            }
        }
    }
}
