//! Retry with exponential backoff.

use crate::error::{EnrichmentError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use vellum_config::RetryConfig;

/// Bounded retry policy.
///
/// The delay before attempt `n + 1` is `base_delay * 2^(n - 1)`, capped at
/// `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Delay after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently or the attempt
    /// budget is spent.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = label, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_retriable() => return Err(error),
                Err(error) if attempt >= self.max_attempts => {
                    warn!(operation = label, attempts = attempt, %error, "Giving up");
                    return Err(EnrichmentError::RetriesExhausted {
                        attempts: attempt,
                        last_error: error.to_string(),
                    });
                }
                Err(error) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        ?delay,
                        %error,
                        "Attempt failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
