//! Integration tests: drive `run_with_retry` with scripted operations on paused time.
//!
//! Every test runs with tokio's clock paused, so sleeps advance virtual time
//! instantly and elapsed time can be asserted without real waiting.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use exutil_core::retry::{
    run_with_retry, BackoffConfig, ClassifiedError, ExchangeError, RetryRunner,
};
use tokio::time::Instant;

type TestError = ClassifiedError<&'static str>;

fn expected_backoff(cfg: &BackoffConfig, steps: u32) -> Duration {
    (0..steps).map(|i| cfg.delay_for(i)).sum()
}

/// The timer wheel rounds deadlines up to whole milliseconds.
fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual - expected < Duration::from_millis(100),
        "elapsed {:?}, expected about {:?}",
        actual,
        expected
    );
}

#[tokio::test(start_paused = true)]
async fn success_on_first_attempt_invokes_once() {
    let calls = Cell::new(0u32);
    let result: Result<&str, TestError> = run_with_retry(&BackoffConfig::default(), || {
        calls.set(calls.get() + 1);
        async { Ok("filled") }
    })
    .await;
    assert_eq!(result.unwrap(), "filled");
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn unclassified_error_terminates_immediately() {
    let calls = Cell::new(0u32);
    let start = Instant::now();
    let result: Result<(), TestError> = run_with_retry(&BackoffConfig::default(), || {
        calls.set(calls.get() + 1);
        async { Err(ClassifiedError::new("rejected")) }
    })
    .await;
    assert_eq!(result.unwrap_err().into_inner(), "rejected");
    assert_eq!(calls.get(), 1);
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn default_budget_gives_ten_retries() {
    let cfg = BackoffConfig::default();
    let calls = Cell::new(0u32);
    let start = Instant::now();
    let result: Result<(), TestError> = run_with_retry(&cfg, || {
        calls.set(calls.get() + 1);
        async { Err(ClassifiedError::new("nonce").retry()) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.get(), 11);
    assert_elapsed(start.elapsed(), expected_backoff(&cfg, 10));
}

#[tokio::test(start_paused = true)]
async fn limited_budget_caps_invocations() {
    let calls = Cell::new(0u32);
    let result: Result<(), TestError> = run_with_retry(&BackoffConfig::default(), || {
        calls.set(calls.get() + 1);
        async { Err(ClassifiedError::new("busy").retry_limited(3)) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.get(), 4);
}

#[tokio::test(start_paused = true)]
async fn recovers_within_budget() {
    let calls = Cell::new(0u32);
    let result: Result<u32, TestError> = run_with_retry(&BackoffConfig::default(), || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move {
            if n < 3 {
                Err(ClassifiedError::new("busy").retry_limited(3))
            } else {
                Ok(n)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn survivable_delay_is_respected_every_time() {
    let seen = RefCell::new(Vec::new());
    let delay = Duration::from_millis(500);
    let result: Result<usize, TestError> = run_with_retry(&BackoffConfig::default(), || {
        seen.borrow_mut().push(Instant::now());
        let n = seen.borrow().len();
        async move {
            if n <= 25 {
                Err(ClassifiedError::new("maintenance")
                    .not_fatal()
                    .backoff_delay(delay))
            } else {
                Ok(n)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 26);
    let seen = seen.borrow();
    for pair in seen.windows(2) {
        assert!(pair[1] - pair[0] >= delay);
    }
}

#[tokio::test(start_paused = true)]
async fn survivable_without_delay_is_paced_on_the_curve() {
    let cfg = BackoffConfig {
        retries: 3,
        ..BackoffConfig::default()
    };
    let seen = RefCell::new(Vec::new());
    let result: Result<(), TestError> = run_with_retry(&cfg, || {
        seen.borrow_mut().push(Instant::now());
        let n = seen.borrow().len();
        async move {
            if n <= 6 {
                Err(ClassifiedError::new("maintenance").not_fatal())
            } else {
                Ok(())
            }
        }
    })
    .await;
    assert!(result.is_ok());
    let seen = seen.borrow();
    assert_eq!(seen.len(), 7);
    // Three steps on the curve, then the cap once the schedule is spent.
    let expected = [
        cfg.delay_for(0),
        cfg.delay_for(1),
        cfg.delay_for(2),
        cfg.max_delay,
        cfg.max_delay,
        cfg.max_delay,
    ];
    for (pair, want) in seen.windows(2).zip(expected) {
        assert_elapsed(pair[1] - pair[0], want);
    }
}

#[tokio::test(start_paused = true)]
async fn zero_budget_does_not_spend_shared_attempts() {
    let calls = Cell::new(0u32);
    let result: Result<(), TestError> = run_with_retry(&BackoffConfig::default(), || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move {
            if n == 1 {
                Err(ClassifiedError::new("busy").retry_limited(0).not_fatal())
            } else {
                Err(ClassifiedError::new("nonce").retry())
            }
        }
    })
    .await;
    assert!(result.is_err());
    // One survivable retry, then the full default budget of ten.
    assert_eq!(calls.get(), 12);
}

/// Documented behavior, not an endorsement: once the bounded budget of an
/// error that is also `not_fatal` is spent, retries continue without limit.
#[tokio::test(start_paused = true)]
async fn bounded_budget_falls_through_to_unbounded_retries() {
    let cfg = BackoffConfig::default();
    let calls = Cell::new(0u32);
    let start = Instant::now();
    let result: Result<u32, TestError> = run_with_retry(&cfg, || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move {
            if n <= 40 {
                Err(ClassifiedError::new("busy")
                    .retry_limited(2)
                    .not_fatal()
                    .backoff_delay(Duration::from_secs(1)))
            } else {
                Ok(n)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 41);
    // Two bounded steps on the curve, then 38 fixed one-second waits.
    assert_elapsed(
        start.elapsed(),
        expected_backoff(&cfg, 2) + Duration::from_secs(38),
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_schedule_stops_bounded_retries() {
    let cfg = BackoffConfig {
        retries: 3,
        ..BackoffConfig::default()
    };
    let calls = Cell::new(0u32);
    let result: Result<(), TestError> = run_with_retry(&cfg, || {
        calls.set(calls.get() + 1);
        async { Err(ClassifiedError::new("busy").retry_limited(50)) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.get(), 4);
}

#[tokio::test(start_paused = true)]
async fn concurrent_runs_do_not_share_budget() {
    let runner = RetryRunner::default();
    let a = Cell::new(0u32);
    let b = Cell::new(0u32);
    let run_a = runner.run(|| {
        a.set(a.get() + 1);
        async { Err::<(), _>(ClassifiedError::new("a").retry_limited(2)) }
    });
    let run_b = runner.run(|| {
        b.set(b.get() + 1);
        async { Err::<(), _>(ClassifiedError::new("b").retry_limited(2)) }
    });
    let (ra, rb) = tokio::join!(run_a, run_b);
    assert!(ra.is_err() && rb.is_err());
    assert_eq!(a.get(), 3);
    assert_eq!(b.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn exchange_errors_drive_the_runner() {
    let calls = Cell::new(0u32);
    let result = run_with_retry(&BackoffConfig::default(), || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move {
            match n {
                1 => Err(ExchangeError::Network("connection reset".into())),
                2 => Err(ExchangeError::rate_limited(5, None)),
                3 => Err(ExchangeError::Maintenance {
                    retry_after: Duration::from_secs(60),
                }),
                _ => Ok("order-42"),
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), "order-42");
    assert_eq!(calls.get(), 4);
}

#[tokio::test(start_paused = true)]
async fn terminal_error_is_returned_unchanged() {
    let calls = Cell::new(0u32);
    let result: Result<(), ExchangeError> = run_with_retry(&BackoffConfig::default(), || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move {
            if n == 1 {
                Err(ExchangeError::Retry("nonce too low".into()))
            } else {
                Err(ExchangeError::InvalidOrder("lot size".into()))
            }
        }
    })
    .await;
    match result {
        Err(ExchangeError::InvalidOrder(msg)) => assert_eq!(msg, "lot size"),
        other => panic!("expected InvalidOrder, got {:?}", other),
    }
    assert_eq!(calls.get(), 2);
}
