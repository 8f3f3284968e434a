use std::time::Duration;

use super::classify::{Classify, Survival};
use super::schedule::{BackoffConfig, BackoffSchedule};

/// What the runner does with the result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// The operation succeeded; hand the value to the caller.
    Success(T),
    /// Bounded retry: wait `delay` (next backoff step), then try again.
    RetryableFailure {
        attempts_remaining: u32,
        delay: Duration,
        cause: E,
    },
    /// Unbounded retry after `delay`; the attempt budget is not consulted.
    SurvivableFailure { delay: Duration, cause: E },
    /// Stop and return `cause` unchanged.
    TerminalFailure { cause: E },
}

/// Per-invocation retry state: the attempt counter and the backoff schedule.
///
/// Created at the start of one runner invocation and dropped at its end.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    schedule: BackoffSchedule,
    max_delay: Duration,
}

impl RetryState {
    pub fn new(config: &BackoffConfig) -> Self {
        Self {
            attempt: 0,
            schedule: config.schedule(),
            max_delay: config.max_delay,
        }
    }

    /// Number of errors counted against the bounded budget so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Next step of the curve, or `max_delay` once the schedule is spent.
    fn paced_delay(&mut self) -> Duration {
        self.schedule.next().map_or(self.max_delay, |step| step.delay)
    }

    /// Classify the result of one attempt.
    ///
    /// The bounded path is checked first and counts every error whose budget
    /// grants at least one retry, whether or not a retry is left. The schedule
    /// ceiling caps the bounded path too: once the schedule is exhausted no
    /// bounded retry is granted, even if `max_attempts` is not reached. After
    /// that the error's survival flag decides between an unbounded retry
    /// (paced on the schedule, or at its explicit delay) and terminal failure.
    pub fn decide<T, E: Classify>(&mut self, result: Result<T, E>) -> Outcome<T, E> {
        let cause = match result {
            Ok(value) => return Outcome::Success(value),
            Err(e) => e,
        };
        let class = cause.classification();

        if class.retry.is_retryable() {
            let max_attempts = class.retry.max_attempts();
            let attempt = self.attempt;
            self.attempt = self.attempt.saturating_add(1);
            if attempt < max_attempts {
                if let Some(step) = self.schedule.next() {
                    return Outcome::RetryableFailure {
                        attempts_remaining: max_attempts - attempt - 1,
                        delay: step.delay,
                        cause,
                    };
                }
            }
        }

        match class.survival {
            Survival::After(d) if !d.is_zero() => Outcome::SurvivableFailure { delay: d, cause },
            Survival::After(_) | Survival::Immediate => Outcome::SurvivableFailure {
                delay: self.paced_delay(),
                cause,
            },
            Survival::Fatal => Outcome::TerminalFailure { cause },
        }
    }
}
