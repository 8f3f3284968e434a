//! Exchange call error type with retry classification.

use std::time::Duration;

use thiserror::Error;

use super::classify::{Classification, Classify, RetryBudget, Survival};

/// Error returned by a single exchange API call.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transient failure the exchange wrapper asks to retry.
    #[error("{0}")]
    Retry(String),
    /// Request throttled. Retried up to `retries` times on the backoff curve,
    /// then forever at `retry_after` if the exchange gave one.
    #[error("rate limited")]
    RateLimited {
        retries: u32,
        retry_after: Option<Duration>,
    },
    /// Exchange is in maintenance. Retried every `retry_after` until it is back.
    #[error("exchange under maintenance")]
    Maintenance { retry_after: Duration },
    /// Connection reset, DNS failure and the like.
    #[error("network: {0}")]
    Network(String),
    /// Order rejected by the exchange. Not retried.
    #[error("invalid order: {0}")]
    InvalidOrder(String),
    /// Caller asked to stop (e.g. bad credentials). Not retried.
    #[error("aborted: {0}")]
    Abort(String),
    /// Any other exchange-reported error. Not retried.
    #[error("{0}")]
    Exchange(String),
}

impl ExchangeError {
    pub fn rate_limited(retries: u32, retry_after: Option<Duration>) -> Self {
        ExchangeError::RateLimited {
            retries,
            retry_after,
        }
    }
}

impl Classify for ExchangeError {
    fn classification(&self) -> Classification {
        match self {
            ExchangeError::Retry(_) | ExchangeError::Network(_) => {
                Classification::bounded(RetryBudget::Default)
            }
            ExchangeError::RateLimited {
                retries,
                retry_after,
            } => Classification {
                retry: RetryBudget::Limited(*retries),
                survival: retry_after.map_or(Survival::Fatal, Survival::After),
            },
            ExchangeError::Maintenance { retry_after } => {
                Classification::survivable(Survival::After(*retry_after))
            }
            ExchangeError::InvalidOrder(_) | ExchangeError::Abort(_) | ExchangeError::Exchange(_) => {
                Classification::TERMINAL
            }
        }
    }
}
