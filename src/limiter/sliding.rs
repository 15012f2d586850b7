//! # Sliding-window limiter.
//!
//! A call for `key` is allowed iff fewer than `limit` accepted calls happened in
//! the trailing `window`; an allowed call is recorded, a denied one is not.
//!
//! ```text
//! limit = 3, window = 60s
//!   t=0   allow  [0]
//!   t=10  allow  [0, 10]
//!   t=20  allow  [0, 10, 20]
//!   t=25  deny   retry_after = 35s
//!   t=61  allow  [10, 20, 61]      (t=0 expired)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use envisor::SlidingWindowLimiter;
//!
//! let limiter = SlidingWindowLimiter::new();
//! let window = Duration::from_secs(60);
//! assert!(limiter.allow("10.0.0.7", 2, window));
//! assert!(limiter.allow("10.0.0.7", 2, window));
//! assert!(!limiter.allow("10.0.0.7", 2, window));
//! assert!(limiter.allow("10.0.0.8", 2, window));
//! ```

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::limiter::{MemoryStore, WindowStore};

/// Outcome of one limiter check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Recorded; `remaining` more calls fit in the current window.
    Allowed { remaining: usize },
    /// Over the limit; the earliest recorded call expires after `retry_after`.
    Denied { retry_after: Duration },
    /// The store errored and the call was let through.
    FailedOpen,
}

impl Decision {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Denied { .. })
    }
}

/// Keyed sliding-window rate limiter.
///
/// Safe to share across tasks (`Arc<SlidingWindowLimiter>`); all state lives in the store.
#[derive(Debug, Default)]
pub struct SlidingWindowLimiter<S: WindowStore = MemoryStore> {
    store: S,
}

impl SlidingWindowLimiter<MemoryStore> {
    /// Limiter backed by an in-process [`MemoryStore`].
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }
}

impl<S: WindowStore> SlidingWindowLimiter<S> {
    /// Limiter backed by a custom store.
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    /// `true` if the call is allowed (and recorded).
    pub fn allow(&self, key: &str, limit: usize, window: Duration) -> bool {
        self.check(key, limit, window).is_allowed()
    }

    /// Full decision for a call happening now.
    pub fn check(&self, key: &str, limit: usize, window: Duration) -> Decision {
        self.check_at(key, limit, window, Instant::now())
    }

    /// Full decision for a call happening at `now`.
    pub fn check_at(&self, key: &str, limit: usize, window: Duration, now: Instant) -> Decision {
        match self.store.admit(key, limit, window, now) {
            Ok(decision) => {
                if let Decision::Denied { retry_after } = decision {
                    debug!(key, limit, retry_after_ms = retry_after.as_millis() as u64, "rate limited");
                }
                decision
            }
            Err(e) => {
                warn!(key, error = %e, "rate limiter store failed; allowing call");
                Decision::FailedOpen
            }
        }
    }

    /// Drops keys idle for longer than `window`. Returns the number dropped (0 on store error).
    pub fn purge_idle(&self, window: Duration) -> usize {
        self.store
            .purge_idle(window, Instant::now())
            .unwrap_or_else(|e| {
                warn!(error = %e, "rate limiter purge failed");
                0
            })
    }

    /// Number of keys currently tracked (0 on store error).
    pub fn tracked_keys(&self) -> usize {
        self.store.tracked_keys().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::MonitorError;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_window_scenario() {
        let limiter = SlidingWindowLimiter::new();
        let t0 = Instant::now();
        let at = |s: u64| t0 + Duration::from_secs(s);

        assert!(limiter.check_at("k", 3, WINDOW, at(0)).is_allowed());
        assert!(limiter.check_at("k", 3, WINDOW, at(10)).is_allowed());
        assert_eq!(
            limiter.check_at("k", 3, WINDOW, at(20)),
            Decision::Allowed { remaining: 0 }
        );
        assert_eq!(
            limiter.check_at("k", 3, WINDOW, at(25)),
            Decision::Denied {
                retry_after: Duration::from_secs(35)
            }
        );
        assert_eq!(
            limiter.check_at("k", 3, WINDOW, at(61)),
            Decision::Allowed { remaining: 0 }
        );
        assert!(!limiter.check_at("k", 3, WINDOW, at(62)).is_allowed());
    }

    #[test]
    fn test_denied_calls_are_not_recorded() {
        let limiter = SlidingWindowLimiter::new();
        let t0 = Instant::now();
        assert!(limiter.check_at("k", 1, WINDOW, t0).is_allowed());
        for s in 1..50 {
            assert!(!limiter.check_at("k", 1, WINDOW, t0 + Duration::from_secs(s)).is_allowed());
        }
        // Only the t=0 entry counts, so t=60 is free again.
        assert!(limiter.check_at("k", 1, WINDOW, t0 + WINDOW).is_allowed());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new();
        assert!(limiter.allow("a", 1, WINDOW));
        assert!(!limiter.allow("a", 1, WINDOW));
        assert!(limiter.allow("b", 1, WINDOW));
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_zero_limit_always_denies() {
        let limiter = SlidingWindowLimiter::new();
        assert!(!limiter.allow("k", 0, WINDOW));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_idle_drops_expired_keys() {
        let limiter = SlidingWindowLimiter::new();
        limiter.allow("old", 5, WINDOW);
        tokio::time::advance(Duration::from_secs(30)).await;
        limiter.allow("fresh", 5, WINDOW);
        tokio::time::advance(Duration::from_secs(40)).await;

        assert_eq!(limiter.purge_idle(WINDOW), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    struct BrokenStore;

    impl WindowStore for BrokenStore {
        fn admit(&self, _: &str, _: usize, _: Duration, _: Instant) -> Result<Decision, MonitorError> {
            Err(MonitorError::communication("connection refused"))
        }
        fn purge_idle(&self, _: Duration, _: Instant) -> Result<usize, MonitorError> {
            Err(MonitorError::communication("connection refused"))
        }
        fn tracked_keys(&self) -> Result<usize, MonitorError> {
            Err(MonitorError::communication("connection refused"))
        }
    }

    #[test]
    fn test_store_failure_fails_open() {
        let limiter = SlidingWindowLimiter::with_store(BrokenStore);
        for _ in 0..10 {
            assert_eq!(limiter.check("k", 1, WINDOW), Decision::FailedOpen);
            assert!(limiter.allow("k", 1, WINDOW));
        }
        assert_eq!(limiter.purge_idle(WINDOW), 0);
    }

    #[test]
    fn test_concurrent_callers_respect_limit() {
        let limiter = Arc::new(SlidingWindowLimiter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let l = Arc::clone(&limiter);
                std::thread::spawn(move || (0..25).filter(|_| l.allow("shared", 50, WINDOW)).count())
            })
            .collect();
        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }
}
