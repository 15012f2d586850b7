//! # Linear backoff.
//!
//! [`BackoffPolicy`] computes the wait before retry number `n` as `base × n`,
//! clamped to [`BackoffPolicy::max`], then applies jitter. The base delay is
//! derived purely from the attempt number, so jitter output never feeds back
//! into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use envisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     base: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(1), Duration::from_millis(100));
//! assert_eq!(backoff.next(3), Duration::from_millis(300));
//! assert_eq!(backoff.next(50), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt; grows linearly.
    pub base: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Jitter applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `base = 200ms`, `max = 5s`, no jitter.
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            max: Duration::from_secs(5),
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Linear policy with no cap beyond `Duration::MAX` and no jitter.
    pub fn linear(base: Duration) -> Self {
        Self {
            base,
            max: Duration::MAX,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay after failed attempt `attempt` (1-based).
    ///
    /// `attempt = 0` is treated as 1.
    pub fn next(&self, attempt: u32) -> Duration {
        let base = self
            .base
            .checked_mul(attempt.max(1))
            .unwrap_or(self.max)
            .min(self.max);
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_growth_no_jitter() {
        let policy = BackoffPolicy {
            base: Duration::from_millis(100),
            max: Duration::from_secs(30),
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(1), Duration::from_millis(100));
        assert_eq!(policy.next(2), Duration::from_millis(200));
        assert_eq!(policy.next(3), Duration::from_millis(300));
        assert_eq!(policy.next(10), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_attempt_uses_base() {
        let policy = BackoffPolicy::linear(Duration::from_millis(50));
        assert_eq!(policy.next(0), Duration::from_millis(50));
    }

    #[test]
    fn test_clamped_to_max() {
        let policy = BackoffPolicy {
            base: Duration::from_millis(400),
            max: Duration::from_secs(1),
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(3), Duration::from_secs(1));
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        let policy = BackoffPolicy {
            base: Duration::from_secs(u64::MAX / 2),
            max: Duration::from_secs(10),
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_equal_jitter_bounds() {
        let policy = BackoffPolicy {
            base: Duration::from_millis(1000),
            max: Duration::from_secs(30),
            jitter: JitterPolicy::Equal,
        };
        for attempt in 1..20 {
            let base_ms = (1000 * u64::from(attempt)).min(30_000);
            let delay = policy.next(attempt);
            assert!(delay >= Duration::from_millis(base_ms / 2));
            assert!(delay <= Duration::from_millis(base_ms));
        }
    }
}
