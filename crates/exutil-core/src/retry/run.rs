//! Retry loop: run an async operation until success or its error says stop.

use std::fmt;
use std::future::Future;

use super::classify::Classify;
use super::policy::{Outcome, RetryState};
use super::schedule::BackoffConfig;

/// Runs `operation` until it succeeds or returns an error that is neither
/// retryable within budget nor survivable. Only one attempt is in flight at a
/// time; delays are timer sleeps. The final error is returned unchanged.
pub async fn run_with_retry<T, E, F, Fut>(config: &BackoffConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + fmt::Display,
{
    let mut state = RetryState::new(config);
    loop {
        let result = operation().await;
        match state.decide(result) {
            Outcome::Success(value) => return Ok(value),
            Outcome::RetryableFailure {
                attempts_remaining,
                delay,
                cause,
            } => {
                tracing::debug!(
                    attempt = state.attempts(),
                    attempts_remaining,
                    delay_ms = delay.as_millis() as u64,
                    "retrying: {}",
                    cause
                );
                tokio::time::sleep(delay).await;
            }
            Outcome::SurvivableFailure { delay, cause } => {
                tracing::debug!(
                    delay_ms = delay.as_millis() as u64,
                    "not fatal, retrying: {}",
                    cause
                );
                tokio::time::sleep(delay).await;
            }
            Outcome::TerminalFailure { cause } => {
                if state.attempts() > 0 {
                    tracing::warn!(attempts = state.attempts(), "giving up: {}", cause);
                }
                return Err(cause);
            }
        }
    }
}

/// Owns a backoff configuration and runs operations under it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryRunner {
    config: BackoffConfig,
}

impl RetryRunner {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// See [`run_with_retry`]. Each call gets its own counter and schedule, so
    /// concurrent runs on one runner do not interfere.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + fmt::Display,
    {
        run_with_retry(&self.config, operation).await
    }
}
