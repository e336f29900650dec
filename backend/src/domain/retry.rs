//! Bounded retry for idempotent store reads.
//!
//! Only read operations go through [`RetryPolicy::run`]; writes are attempted
//! exactly once so a retried create can never double-apply. Callers decide
//! which errors are transient; definitional failures such as duplicates or
//! engine rejections must never be classed as transient.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Attempt budget and linear backoff for transient read failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Up to `max_attempts` tries (at least one), sleeping `backoff * n`
    /// before the n-th retry.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Total attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent. The last error is returned.
    pub async fn run<T, E, Op, Fut>(
        &self,
        operation: &'static str,
        is_transient: impl Fn(&E) -> bool,
        mut op: Op,
    ) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && is_transient(&err) => {
                    debug!(operation, attempt, error = %err, "retrying transient store failure");
                    tokio::time::sleep(self.backoff.saturating_mul(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
