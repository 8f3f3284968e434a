//! `exutil simulate` – drive the retry engine with a scripted failing operation.

use anyhow::Result;
use exutil_core::config::ExutilConfig;
use exutil_core::retry::{run_with_retry, BackoffConfig, ClassifiedError, Classify, RetryBudget};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub failures: u32,
    pub retry: RetryBudget,
    pub not_fatal: bool,
    pub backoff_ms: Option<u64>,
    /// Fail with the configured rate-limit error instead of the flags above.
    pub rate_limited: bool,
}

impl SimulateOptions {
    fn error_for(&self, attempt: u32) -> ClassifiedError<String> {
        let mut err = ClassifiedError::new(format!("scripted failure #{}", attempt));
        err = match self.retry {
            RetryBudget::Never => err,
            RetryBudget::Default => err.retry(),
            RetryBudget::Limited(n) => err.retry_limited(n),
        };
        if self.not_fatal {
            err = err.not_fatal();
        }
        if let Some(ms) = self.backoff_ms {
            err = err.backoff_delay(Duration::from_millis(ms));
        }
        err
    }
}

/// Parse `never`/`false`, `default`/`true`, or a retry count.
pub fn parse_retry_budget(s: &str) -> Result<RetryBudget, String> {
    match s {
        "never" | "false" => Ok(RetryBudget::Never),
        "default" | "true" => Ok(RetryBudget::Default),
        n => n
            .parse::<u32>()
            .map(RetryBudget::Limited)
            .map_err(|_| format!("expected never, default or a count, got {:?}", s)),
    }
}

/// Result of one simulated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulateReport {
    pub calls: u32,
    pub succeeded: bool,
}

pub async fn run_simulate(cfg: &ExutilConfig, opts: &SimulateOptions) -> Result<SimulateReport> {
    let backoff = cfg.backoff()?;
    let report = if opts.rate_limited {
        let retry_after = opts.backoff_ms.map(Duration::from_millis);
        drive(&backoff, opts.failures, |_| cfg.rate_limited(retry_after)).await
    } else {
        drive(&backoff, opts.failures, |attempt| opts.error_for(attempt)).await
    };
    Ok(report)
}

async fn drive<E, M>(backoff: &BackoffConfig, failures: u32, make_error: M) -> SimulateReport
where
    E: Classify + fmt::Display,
    M: Fn(u32) -> E,
{
    let calls = AtomicU32::new(0);
    let started = Instant::now();
    let result = run_with_retry(backoff, || {
        let attempt = calls.fetch_add(1, Ordering::Relaxed) + 1;
        let outcome = if attempt <= failures {
            Err(make_error(attempt))
        } else {
            Ok(attempt)
        };
        async move { outcome }
    })
    .await;

    let secs = started.elapsed().as_secs_f64();
    let calls = calls.load(Ordering::Relaxed);
    match &result {
        Ok(attempt) => println!("succeeded on attempt {} after {:.1}s", attempt, secs),
        Err(e) => println!("gave up after {} attempt(s) and {:.1}s: {}", calls, secs, e),
    }
    SimulateReport {
        calls,
        succeeded: result.is_ok(),
    }
}
