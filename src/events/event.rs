//! # Events published by the monitoring loop.
//!
//! The [`EventKind`] enum classifies events into three groups:
//! - **Tick events**: what one iteration produced (reading, alerts, errors)
//! - **Lifecycle events**: loop started, stopped, tick skipped
//! - **Subscriber events**: delivery problems inside the fan-out layer
//!
//! The [`Event`] struct carries the payload for each kind. Payloads are shared
//! (`Arc`) so the broadcast clone per receiver stays cheap.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Within one tick, `Reading` precedes `Alerts`, which precedes any `Error`.
//!
//! ## Example
//! ```rust
//! use envisor::{Event, EventKind, MonitorError, Stage};
//!
//! let err = MonitorError::sensor("i2c timeout");
//! let ev = Event::error(Stage::Read, &err);
//!
//! assert_eq!(ev.kind, EventKind::Error);
//! assert_eq!(ev.stage, Some(Stage::Read));
//! assert_eq!(ev.error_label, Some("sensor_error"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::{
    error::{MonitorError, Stage},
    model::{Alert, Reading},
};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of monitor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Tick events ===
    /// A reading was taken. Sets `reading`.
    Reading,

    /// The reading violated at least one threshold. Sets `alerts` (never empty).
    Alerts,

    /// A stage of the tick failed.
    ///
    /// Sets:
    /// - `stage`: where it failed (`Read`, `Actuate(..)`, `Export`)
    /// - `reason`: error message
    /// - `error_label`: stable error label (e.g. `output_error`)
    Error,

    // === Lifecycle events ===
    /// The loop was started. Sets `interval_ms`.
    Started,

    /// The loop stopped after its last tick settled.
    Stopped,

    /// A tick fired while the previous one was still running and was dropped.
    TickSkipped,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `subscriber` and `reason` (`full` / `closed`).
    SubscriberOverflow,

    /// Subscriber panicked while handling an event.
    ///
    /// Sets `subscriber` and `reason` (panic message).
    SubscriberPanicked,
}

impl EventKind {
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::Reading => "reading",
            EventKind::Alerts => "alerts",
            EventKind::Error => "error",
            EventKind::Started => "started",
            EventKind::Stopped => "stopped",
            EventKind::TickSkipped => "tick_skipped",
            EventKind::SubscriberOverflow => "subscriber_overflow",
            EventKind::SubscriberPanicked => "subscriber_panicked",
        }
    }
}

/// Monitor event with optional payload.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    pub reading: Option<Reading>,
    pub alerts: Option<Arc<[Alert]>>,
    pub stage: Option<Stage>,
    /// Human-readable reason (error message, overflow cause, panic info).
    pub reason: Option<Arc<str>>,
    /// Stable label of the error behind an `Error` event.
    pub error_label: Option<&'static str>,
    /// Subscriber name for subscriber events.
    pub subscriber: Option<&'static str>,
    /// Loop interval, for `Started`.
    pub interval_ms: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            reading: None,
            alerts: None,
            stage: None,
            reason: None,
            error_label: None,
            subscriber: None,
            interval_ms: None,
        }
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.interval_ms = Some(ms);
        self
    }

    /// `Reading` event.
    pub fn reading(reading: Reading) -> Self {
        let mut ev = Event::new(EventKind::Reading);
        ev.reading = Some(reading);
        ev
    }

    /// `Alerts` event.
    pub fn alerts(alerts: Arc<[Alert]>) -> Self {
        let mut ev = Event::new(EventKind::Alerts);
        ev.alerts = Some(alerts);
        ev
    }

    /// `Error` event for a failure in `stage`.
    pub fn error(stage: Stage, err: &MonitorError) -> Self {
        let mut ev = Event::new(EventKind::Error).with_reason(err.to_string());
        ev.stage = Some(stage);
        ev.error_label = Some(err.as_label());
        ev
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panicked(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActuatorKind;
    use crate::model::{AlertKind, Severity};

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::Started);
        let b = Event::new(EventKind::Stopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_error_event_carries_stage_and_label() {
        let err = MonitorError::output(ActuatorKind::Relay, "stuck");
        let ev = Event::error(Stage::Actuate(ActuatorKind::Relay), &err);
        assert_eq!(ev.stage, Some(Stage::Actuate(ActuatorKind::Relay)));
        assert_eq!(ev.error_label, Some("output_error"));
        assert!(ev.reason.as_deref().unwrap_or_default().contains("stuck"));
    }

    #[test]
    fn test_alerts_payload_is_shared() {
        let alerts: Arc<[Alert]> = vec![Alert::new(
            AlertKind::Humidity,
            Severity::Warning,
            80.0,
            "humid",
        )]
        .into();
        let ev = Event::alerts(Arc::clone(&alerts));
        let copy = ev.clone();
        assert!(Arc::ptr_eq(copy.alerts.as_ref().unwrap(), &alerts));
    }

    #[test]
    fn test_overflow_constructor() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.subscriber, Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
