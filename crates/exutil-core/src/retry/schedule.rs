use std::time::Duration;

use thiserror::Error;

/// Parameters of the backoff curve used by the bounded retry path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    /// Number of steps the schedule yields before it is exhausted.
    pub retries: u32,
    /// Growth factor applied per step.
    pub factor: f64,
    /// Delay of the first step and lower bound for every step.
    pub min_delay: Duration,
    /// Upper bound on any step.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            retries: 100,
            factor: 1.2,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BackoffConfigError {
    #[error("backoff factor must be a finite number >= 1 (got {0})")]
    InvalidFactor(f64),
    #[error("min delay {min:?} exceeds max delay {max:?}")]
    InvertedBounds { min: Duration, max: Duration },
}

impl BackoffConfig {
    pub fn validate(&self) -> Result<(), BackoffConfigError> {
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(BackoffConfigError::InvalidFactor(self.factor));
        }
        if self.min_delay > self.max_delay {
            return Err(BackoffConfigError::InvertedBounds {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        Ok(())
    }

    /// Delay for a 0-based step: `min_delay * factor^attempt`, clamped to
    /// `[min_delay, max_delay]`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let raw = self.min_delay.as_secs_f64() * self.factor.powi(exp);
        Duration::try_from_secs_f64(raw)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
            .max(self.min_delay)
    }

    /// Fresh schedule for one runner invocation.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            config: *self,
            next: 0,
        }
    }
}

/// One step of a [`BackoffSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffStep {
    /// 0-based step index.
    pub attempt: u32,
    pub delay: Duration,
}

/// Lazy, finite sequence of backoff steps. Not shared between invocations.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    config: BackoffConfig,
    next: u32,
}

impl BackoffSchedule {
    pub fn remaining(&self) -> u32 {
        self.config.retries.saturating_sub(self.next)
    }
}

impl Iterator for BackoffSchedule {
    type Item = BackoffStep;

    fn next(&mut self) -> Option<BackoffStep> {
        if self.next >= self.config.retries {
            return None;
        }
        let attempt = self.next;
        self.next += 1;
        Some(BackoffStep {
            attempt,
            delay: self.config.delay_for(attempt),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BackoffSchedule {}
