//! # Shared monitor state.
//!
//! Two cells, both holding `Arc` snapshots that are swapped wholesale:
//!
//! ```text
//! thresholds : RwLock<Arc<ThresholdConfig>>   replaced by update_thresholds()
//! snapshot   : RwLock<Arc<Snapshot>>          replaced at the end of each tick
//!                ├─ version    (+1 per commit)
//!                ├─ alerts     Arc<[Alert]>
//!                └─ actuators  ActuatorState
//! ```
//!
//! Locks are held only for the pointer swap or clone, never across an await.
//! A poisoned lock still holds a complete snapshot, so it is recovered.

use std::sync::{Arc, PoisonError, RwLock};

use crate::model::{ActuatorState, Alert, ThresholdConfig};

/// One committed tick result.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub version: u64,
    pub alerts: Arc<[Alert]>,
    pub actuators: ActuatorState,
}

pub(crate) struct StateCell {
    thresholds: RwLock<Arc<ThresholdConfig>>,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl StateCell {
    pub fn new(thresholds: ThresholdConfig, actuators: ActuatorState) -> Self {
        Self {
            thresholds: RwLock::new(Arc::new(thresholds)),
            snapshot: RwLock::new(Arc::new(Snapshot {
                version: 0,
                alerts: Arc::from(Vec::new()),
                actuators,
            })),
        }
    }

    /// Thresholds in effect right now; a tick captures this once at its start.
    pub fn thresholds(&self) -> Arc<ThresholdConfig> {
        let guard = self.thresholds.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace_thresholds(&self, cfg: ThresholdConfig) {
        let mut guard = self.thresholds.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(cfg);
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publishes a new snapshot and returns its version.
    pub fn commit(&self, alerts: Arc<[Alert]>, actuators: ActuatorState) -> u64 {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let version = guard.version + 1;
        *guard = Arc::new(Snapshot {
            version,
            alerts,
            actuators,
        });
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertKind, Range, Severity};

    #[test]
    fn test_commit_bumps_version_and_keeps_old_snapshots_intact() {
        let cell = StateCell::new(ThresholdConfig::default(), ActuatorState::initial(4, 1));
        let before = cell.snapshot();

        let alerts: Arc<[Alert]> =
            vec![Alert::new(AlertKind::Temperature, Severity::Danger, 35.0, "hot")].into();
        let v = cell.commit(alerts, ActuatorState::initial(4, 1));

        assert_eq!(v, 1);
        assert_eq!(before.version, 0);
        assert!(before.alerts.is_empty());
        assert_eq!(cell.snapshot().alerts.len(), 1);
    }

    #[test]
    fn test_replaced_thresholds_do_not_affect_captured_copy() {
        let cell = StateCell::new(ThresholdConfig::default(), ActuatorState::initial(1, 1));
        let captured = cell.thresholds();

        let mut next = ThresholdConfig::default();
        next.temperature = Range::new(0.0, 10.0);
        cell.replace_thresholds(next.clone());

        assert_eq!(*captured, ThresholdConfig::default());
        assert_eq!(*cell.thresholds(), next);
    }
}
