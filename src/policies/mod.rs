//! Retry policies.
//!
//! This module groups the knobs that control **whether** a failed call is
//! retried and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`]   attempt budget + retryable-kind classifier
//! - [`BackoffPolicy`] linear delay growth (`base × attempt`, capped)
//! - [`JitterPolicy`]  optional randomization on top of the backoff
//!
//! ## Quick wiring
//! ```text
//! MonitorConfig { actuator_retry, read_retry }  (RetrySettings::policy())
//!      └─► core::executor::run_with_retry uses:
//!           - retryable(kind) to decide retry / propagate
//!           - backoff.next(attempt) to schedule the next attempt
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 3 attempts, base=200ms, max=5s, jitter=None.
//! - `JitterPolicy::None`, so the linear schedule is exact.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
