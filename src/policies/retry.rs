//! # Retry policy.
//!
//! [`RetryPolicy`] is stateless configuration, one instance per call site
//! (sensor read, each actuator). It answers two questions for the executor:
//! may this error kind be retried, and how long to wait before attempt `n + 1`.

use std::fmt;
use std::time::Duration;

use crate::error::ErrorKind;
use crate::policies::BackoffPolicy;

/// Attempt budget, backoff schedule and retry classifier.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first one (`0` is treated as `1`).
    pub max_attempts: u32,
    /// Delay schedule between attempts.
    pub backoff: BackoffPolicy,
    /// Classifier: `true` if an error of this kind may be retried.
    pub retryable: fn(ErrorKind) -> bool,
}

impl Default for RetryPolicy {
    /// 3 attempts, default backoff, transient kinds retryable.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
            retryable: ErrorKind::is_transient,
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Linear policy: `max_attempts` tries, waiting `base_delay × attempt` between them.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: BackoffPolicy::linear(base_delay),
            retryable: ErrorKind::is_transient,
        }
    }

    /// Replaces the classifier.
    #[must_use]
    pub fn with_classifier(mut self, retryable: fn(ErrorKind) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Attempt budget clamped to a minimum of 1.
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    #[inline]
    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        (self.retryable)(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attempts_clamped() {
        let p = RetryPolicy::new(0, Duration::from_millis(10));
        assert_eq!(p.attempts(), 1);
    }

    #[test]
    fn test_default_classifier() {
        let p = RetryPolicy::default();
        assert!(p.is_retryable(ErrorKind::Output));
        assert!(p.is_retryable(ErrorKind::Communication));
        assert!(!p.is_retryable(ErrorKind::Validation));
    }

    #[test]
    fn test_custom_classifier() {
        let p = RetryPolicy::default().with_classifier(|k| k == ErrorKind::Sensor);
        assert!(p.is_retryable(ErrorKind::Sensor));
        assert!(!p.is_retryable(ErrorKind::Output));
    }
}
