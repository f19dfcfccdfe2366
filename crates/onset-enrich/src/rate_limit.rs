//! Minimum spacing between calls to the inference service.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum interval between consecutive requests.
///
/// Holds a single "last request" timestamp. The first call proceeds
/// immediately; each later call sleeps for whatever remains of the interval.
#[derive(Debug)]
pub struct MinIntervalLimiter {
    interval: Duration,
    last_request: Option<Instant>,
}

impl MinIntervalLimiter {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the interval since the previous call has elapsed, then
    /// records now as the latest request time.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis(), "waiting before next inference request");
                tokio::time::sleep(wait).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}
