//! # Jitter for retry delays.
//!
//! Several actuators retrying on the same tick would otherwise wake up in
//! lockstep against a shared bus.
//!
//! - [`JitterPolicy::None`]: exact backoff delay
//! - [`JitterPolicy::Full`]: random delay in [0, delay]
//! - [`JitterPolicy::Equal`]: delay/2 + random[0, delay/2]

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Randomization applied to a computed backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterPolicy {
    /// Exact delays. Default.
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Uniform in `[delay/2, delay]`.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => full_jitter(delay),
            JitterPolicy::Equal => equal_jitter(delay),
        }
    }
}

fn full_jitter(delay: Duration) -> Duration {
    let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

fn equal_jitter(delay: Duration) -> Duration {
    let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    if ms == 0 {
        return Duration::ZERO;
    }
    let half = ms / 2;
    let jitter = if half == 0 {
        0
    } else {
        rand::rng().random_range(0..=half)
    };
    Duration::from_millis(ms - half + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(321);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn test_full_jitter_bounds() {
        for _ in 0..100 {
            assert!(JitterPolicy::Full.apply(Duration::from_millis(500)) <= Duration::from_millis(500));
        }
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
    }
}
