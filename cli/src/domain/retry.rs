//! Bounded-retry policy and attempt classification.
//!
//! The executor that sleeps and re-runs operations lives in
//! `crate::application::services::retry`; this module only holds the data
//! and the backoff arithmetic.

use std::time::Duration;

use thiserror::Error;

/// Outcome of one failed attempt, tagged with whether another attempt may help.
#[derive(Debug)]
pub enum AttemptError {
    /// Transient failure: 5xx, 408, 429, transport errors.
    Retryable(anyhow::Error),
    /// The input or request itself is wrong; retrying cannot succeed.
    NonRetryable(anyhow::Error),
}

impl AttemptError {
    pub fn retryable(error: impl Into<anyhow::Error>) -> Self {
        Self::Retryable(error.into())
    }

    pub fn non_retryable(error: impl Into<anyhow::Error>) -> Self {
        Self::NonRetryable(error.into())
    }
}

/// Terminal error of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError {
    /// Surfaced as-is, without retry wording.
    #[error("{0:#}")]
    NonRetryable(anyhow::Error),

    #[error("failed {operation} after {attempts} attempts: {last:#}")]
    Exhausted {
        operation: String,
        attempts: u32,
        last: anyhow::Error,
    },

    #[error("{operation} cancelled after {attempts} attempt(s)")]
    Cancelled { operation: String, attempts: u32 },
}

/// `{maxAttempts, baseDelay, operationName}` with linear backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub operation: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(operation: impl Into<String>, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            operation: operation.into(),
            max_attempts,
            base_delay,
        }
    }

    /// Attempt budget; zero is treated as a single attempt.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before 1-based `attempt`: nothing before the first, then
    /// `base_delay * (attempt - 1)`.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.base_delay.saturating_mul(attempt - 1)
    }
}
