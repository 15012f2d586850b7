//! # Window storage.
//!
//! A [`WindowStore`] keeps, per key, the timestamps of accepted events and makes
//! the check-and-record decision atomically. Expired timestamps are pruned lazily
//! during the same call; there is no background sweeper and no global cap beyond
//! window eviction.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::MonitorError;
use crate::limiter::Decision;

/// Storage behind a [`SlidingWindowLimiter`](crate::SlidingWindowLimiter).
///
/// Implementations must be safe under concurrent calls for different keys.
/// An `Err` makes the limiter fail open.
pub trait WindowStore: Send + Sync + 'static {
    /// Prunes `key`'s expired timestamps, then records `now` iff fewer than
    /// `limit` remain inside `window`.
    fn admit(
        &self,
        key: &str,
        limit: usize,
        window: Duration,
        now: Instant,
    ) -> Result<Decision, MonitorError>;

    /// Drops keys whose newest timestamp is older than `window`; returns how many were dropped.
    fn purge_idle(&self, window: Duration, now: Instant) -> Result<usize, MonitorError>;

    /// Number of keys currently tracked.
    fn tracked_keys(&self) -> Result<usize, MonitorError>;
}

/// In-process store: one timestamp queue per key behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, VecDeque<Instant>>>, MonitorError> {
        self.windows
            .lock()
            .map_err(|_| MonitorError::communication("window store lock poisoned"))
    }
}

impl WindowStore for MemoryStore {
    fn admit(
        &self,
        key: &str,
        limit: usize,
        window: Duration,
        now: Instant,
    ) -> Result<Decision, MonitorError> {
        let mut windows = self.lock()?;
        let stamps = windows.entry(key.to_string()).or_default();

        // Timestamps are appended in order, so expired ones sit at the front.
        while let Some(&oldest) = stamps.front() {
            if now.saturating_duration_since(oldest) >= window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if stamps.len() < limit {
            stamps.push_back(now);
            return Ok(Decision::Allowed {
                remaining: limit - stamps.len(),
            });
        }

        let retry_after = stamps
            .front()
            .map(|&oldest| (oldest + window).saturating_duration_since(now))
            .unwrap_or(window);
        Ok(Decision::Denied { retry_after })
    }

    fn purge_idle(&self, window: Duration, now: Instant) -> Result<usize, MonitorError> {
        let mut windows = self.lock()?;
        let before = windows.len();
        windows.retain(|_, stamps| {
            stamps
                .back()
                .is_some_and(|&newest| now.saturating_duration_since(newest) < window)
        });
        Ok(before - windows.len())
    }

    fn tracked_keys(&self) -> Result<usize, MonitorError> {
        Ok(self.lock()?.len())
    }
}
