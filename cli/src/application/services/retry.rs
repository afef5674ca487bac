//! Application service: bounded retry with linear backoff.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::future::Future;

use anyhow::anyhow;

use crate::application::cancel::CancelSignal;
use crate::application::ports::Sleeper;
use crate::domain::retry::{AttemptError, RetryError, RetryPolicy};

/// Runs an idempotent operation until it succeeds, fails non-retryably,
/// exhausts its attempt budget, or the run is cancelled.
pub struct RetryExecutor<'a, S: Sleeper> {
    policy: RetryPolicy,
    sleeper: &'a S,
    cancel: CancelSignal,
}

impl<'a, S: Sleeper> RetryExecutor<'a, S> {
    pub fn new(policy: RetryPolicy, sleeper: &'a S, cancel: CancelSignal) -> Self {
        Self {
            policy,
            sleeper,
            cancel,
        }
    }

    /// Invoke `operation` with the 1-based attempt number.
    ///
    /// Cancellation is checked before every attempt and raced against both
    /// the backoff sleep and the attempt itself.
    ///
    /// # Errors
    ///
    /// - [`RetryError::NonRetryable`] on the first non-retryable failure.
    /// - [`RetryError::Exhausted`] once every attempt failed retryably.
    /// - [`RetryError::Cancelled`] if the signal fired.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let operation_name = self.policy.operation.as_str();
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.policy.delay_before(attempt);
                tracing::debug!(
                    operation = operation_name,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "backing off before retry"
                );
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => return Err(self.cancelled(attempt - 1)),
                    () = self.sleeper.sleep(delay) => {}
                }
            }
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(attempt - 1));
            }

            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(self.cancelled(attempt)),
                outcome = operation(attempt) => outcome,
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(AttemptError::NonRetryable(error)) => {
                    tracing::debug!(operation = operation_name, attempt, error = %format!("{error:#}"), "non-retryable failure");
                    return Err(RetryError::NonRetryable(error));
                }
                Err(AttemptError::Retryable(error)) => {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = attempts,
                        error = %format!("{error:#}"),
                        "attempt failed"
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(RetryError::Exhausted {
            operation: operation_name.to_string(),
            attempts,
            last: last_error.unwrap_or_else(|| anyhow!("no attempt was made")),
        })
    }

    fn cancelled(&self, attempts: u32) -> RetryError {
        RetryError::Cancelled {
            operation: self.policy.operation.clone(),
            attempts,
        }
    }
}
