//! Retry classification carried by errors returned from exchange calls.

use std::fmt;
use std::time::Duration;

/// Retry cap used when an error asks for retries without naming a count.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// How many bounded retries an error allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryBudget {
    /// Not retryable on the bounded path.
    #[default]
    Never,
    /// Retryable up to [`DEFAULT_MAX_RETRIES`].
    Default,
    /// Retryable up to the given count.
    Limited(u32),
}

impl RetryBudget {
    /// Attempt ceiling the runner compares its counter against.
    pub fn max_attempts(self) -> u32 {
        match self {
            RetryBudget::Never => 0,
            RetryBudget::Default => DEFAULT_MAX_RETRIES,
            RetryBudget::Limited(n) => n,
        }
    }

    /// True if the budget can grant at least one retry. `Never` and
    /// `Limited(0)` are not retryable and are not counted as attempts.
    pub fn is_retryable(self) -> bool {
        self.max_attempts() > 0
    }
}

/// Whether an error may still be retried once the bounded budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Survival {
    /// Give up once the bounded budget is spent.
    #[default]
    Fatal,
    /// Retry without limit, paced on the backoff curve (`max_delay` once the
    /// schedule is spent).
    Immediate,
    /// Retry again after this exact delay, without limit.
    After(Duration),
}

/// Full retry classification of one error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub retry: RetryBudget,
    pub survival: Survival,
}

impl Classification {
    /// Neither bounded nor survivable: propagated on first sight.
    pub const TERMINAL: Classification = Classification {
        retry: RetryBudget::Never,
        survival: Survival::Fatal,
    };

    pub fn bounded(retry: RetryBudget) -> Self {
        Self {
            retry,
            survival: Survival::Fatal,
        }
    }

    pub fn survivable(survival: Survival) -> Self {
        Self {
            retry: RetryBudget::Never,
            survival,
        }
    }
}

/// Errors that know how the retry runner should treat them.
pub trait Classify {
    fn classification(&self) -> Classification;
}

/// Attaches retry flags to an arbitrary error value.
///
/// Mirrors the flags exchange wrappers set on their errors: `retry` (bounded),
/// `not_fatal` (unbounded) and `backoff_delay` (only honoured together with
/// `not_fatal`; a zero delay behaves like no delay).
#[derive(Debug, Clone)]
pub struct ClassifiedError<E> {
    error: E,
    retry: RetryBudget,
    not_fatal: bool,
    backoff_delay: Option<Duration>,
}

impl<E> ClassifiedError<E> {
    /// Wrap an error as terminal. Use the builder methods to loosen it.
    pub fn new(error: E) -> Self {
        Self {
            error,
            retry: RetryBudget::Never,
            not_fatal: false,
            backoff_delay: None,
        }
    }

    /// Retry with the default cap.
    pub fn retry(mut self) -> Self {
        self.retry = RetryBudget::Default;
        self
    }

    pub fn retry_limited(mut self, max_retries: u32) -> Self {
        self.retry = RetryBudget::Limited(max_retries);
        self
    }

    pub fn not_fatal(mut self) -> Self {
        self.not_fatal = true;
        self
    }

    pub fn backoff_delay(mut self, delay: Duration) -> Self {
        self.backoff_delay = Some(delay);
        self
    }

    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn into_inner(self) -> E {
        self.error
    }
}

impl<E> Classify for ClassifiedError<E> {
    fn classification(&self) -> Classification {
        let survival = match (self.not_fatal, self.backoff_delay) {
            (false, _) => Survival::Fatal,
            (true, Some(d)) if !d.is_zero() => Survival::After(d),
            (true, _) => Survival::Immediate,
        };
        Classification {
            retry: self.retry,
            survival,
        }
    }
}

impl<E: fmt::Display> fmt::Display for ClassifiedError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<E> std::error::Error for ClassifiedError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
