//! Retry and backoff policy for exchange calls.
//!
//! Errors carry their own retry classification (bounded budget, survivable
//! flag, survivable delay). The runner turns each failed attempt into an
//! [`Outcome`] and either waits on the backoff curve, waits the survivable
//! delay, or returns the error to the caller.

mod classify;
mod error;
mod policy;
mod run;
mod schedule;

pub use classify::{
    Classification, ClassifiedError, Classify, RetryBudget, Survival, DEFAULT_MAX_RETRIES,
};
pub use error::ExchangeError;
pub use policy::{Outcome, RetryState};
pub use run::{run_with_retry, RetryRunner};
pub use schedule::{BackoffConfig, BackoffConfigError, BackoffSchedule, BackoffStep};
