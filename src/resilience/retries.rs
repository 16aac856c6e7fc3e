//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed attempt is worth repeating
//! - Run an operation up to `max_attempts` times with backoff in between
//! - Surface the last error once the budget is exhausted
//!
//! # Design Decisions
//! - One policy shared by every caller instead of inline loops
//! - Client-error statuses are not retried unless `RetryOn::AnyFailure` is chosen
//! - Decode and request-construction errors are never retried

use std::future::Future;
use std::time::Duration;

use crate::config::{RetryConfig, RetryOn};
use crate::error::ClientError;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;

/// Parametrized retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first. Zero behaves like one.
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub retry_on: RetryOn,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Backoff::from_config(config),
            retry_on: config.retry_on,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::None,
            retry_on: RetryOn::Transient,
        }
    }

    /// Check if an error qualifies for another attempt.
    pub fn is_retryable(&self, err: &ClientError) -> bool {
        match self.retry_on {
            RetryOn::Transient => err.is_transient(),
            RetryOn::AnyFailure => err.is_remote_failure(),
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    /// Run `op` until it succeeds, fails fatally, or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(operation, attempt, "Remote call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if attempt >= max_attempts || !self.is_retryable(&err) {
                        tracing::warn!(
                            operation,
                            attempt,
                            max_attempts,
                            error = %err,
                            "Remote call failed, giving up"
                        );
                        return Err(err);
                    }

                    let delay = self.delay_after(attempt);
                    tracing::info!(
                        operation,
                        attempt,
                        delay = ?delay,
                        error = %err,
                        "Retrying remote call"
                    );
                    metrics::record_retry(operation, err.kind());
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
