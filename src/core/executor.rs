//! # Retry executor: run one operation under a [`RetryPolicy`].
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► op(attempt)
//!   │       ├─ Ok(v)  ──► return Ok(v)
//!   │       └─ Err(e) ──► policy.retryable(e.kind())?
//!   │                      ├─ no                 ─► return Err(e)          (unwrapped)
//!   │                      ├─ attempt == budget  ─► return OperationFailed { last: e }
//!   │                      └─ yes:
//!   │                           ├─ delay = backoff.next(attempt)           (base × attempt)
//!   │                           ├─ debug!("retry scheduled")
//!   │                           ├─ sleep(delay)
//!   │                           └─ continue
//! }
//! ```
//!
//! ## Rules
//! - The operation runs **at most** `policy.attempts()` times.
//! - Non-retryable errors are **never** retried.
//! - Backoff sleeps are not cancellable: once started, a retry sequence runs to
//!   success or exhaustion so no actuator is left in an unknown state.
//! - Each call site runs its own sequence; concurrent sequences do not wait on each other.

use std::future::Future;

use tracing::{debug, warn};

use crate::{error::MonitorError, policies::RetryPolicy};

/// Runs `op` until it succeeds, fails with a non-retryable error, or the budget is spent.
///
/// `op` receives the 1-based attempt number. `operation` names the call site in
/// logs and in [`MonitorError::OperationFailed`].
pub async fn run_with_retry<T, F, Fut>(
    operation: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, MonitorError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, MonitorError>>,
{
    let budget = policy.attempts();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let err = match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };

        if !policy.is_retryable(err.kind()) {
            debug!(operation, attempt, error = %err, "non-retryable failure");
            return Err(err);
        }
        if attempt >= budget {
            warn!(operation, attempts = attempt, error = %err, "retry budget exhausted");
            return Err(MonitorError::OperationFailed {
                operation: operation.to_string(),
                attempts: attempt,
                source: Box::new(err),
            });
        }

        let delay = policy.backoff.next(attempt);
        debug!(
            operation,
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "retry scheduled"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::error::{ActuatorKind, ErrorKind};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_try() {
        let calls = AtomicU32::new(0);
        let res = run_with_retry("op", &policy(3), |_| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, MonitorError>(7)
        })
        .await;
        assert_eq!(res.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let res = run_with_retry("relay", &policy(3), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(MonitorError::output(ActuatorKind::Relay, "nack"))
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert!(res.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_error() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = run_with_retry("servo", &policy(4), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(MonitorError::output(ActuatorKind::Servo, format!("stall #{attempt}"))) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match res.unwrap_err() {
            MonitorError::OperationFailed {
                operation,
                attempts,
                source,
            } => {
                assert_eq!(operation, "servo");
                assert_eq!(attempts, 4);
                assert_eq!(source.to_string(), "servo write failed: stall #4");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = run_with_retry("display", &policy(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(MonitorError::validation("frame", "too many lines")) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(res.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_linear_backoff_schedule() {
        let start = Instant::now();
        let _: Result<(), _> = run_with_retry("leds", &policy(3), |_| async {
            Err(MonitorError::communication("timeout"))
        })
        .await;
        // 100ms after attempt 1, 200ms after attempt 2, none after the last.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "elapsed {elapsed:?}");
    }
}
