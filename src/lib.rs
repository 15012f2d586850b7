//! # envisor
//!
//! **Envisor** is the control core of an environmental monitor: it polls a sensor
//! on a fixed interval, checks the reading against thresholds, drives a display,
//! indicator LEDs, a ventilation relay and a humidity servo, and exports metrics.
//!
//! Hardware, transports and dashboards stay outside; the core talks to them
//! through port traits such as [`SensorReader`] and [`RelayActuator`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   SensorReader        DisplayActuator  LedActuator  RelayActuator  ServoActuator
//!        │                     ▲              ▲             ▲              ▲
//!        ▼                     └──────────────┴──────┬──────┴──────────────┘
//! ┌───────────────────────────────────────────────────┼───────────────────────────┐
//! │  Monitor (loop controller)                        │                           │
//! │  - interval timer + CancellationToken             │                           │
//! │  - single-flight guard (one tick at a time)       │                           │
//! │                                                   │                           │
//! │   TickPipeline:  read ─► evaluate ─► ActuatorOrchestrator ─► MetricsEmitter   │
//! │                   │                   (retry per actuator)        │           │
//! │                   │                                               ▼           │
//! │   StateCell (versioned Arc snapshots)                 MetricsSink (throttled) │
//! └───────────────────┬───────────────────────────────────────────────────────────┘
//!                     ▼ publish
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                 (capacity: MonitorConfig::bus_capacity)           │
//! └──────────────┬───────────────────────────────────┬────────────────┘
//!                ▼                                   ▼
//!      Monitor::subscribe()                 subscriber_listener
//!      (polling receivers)                           │
//!                                              SubscriberSet
//!                                           (per-sub bounded queues)
//!                                         ┌──────────┼──────────┐
//!                                         ▼          ▼          ▼
//!                                      LogWriter   sub2 ...   subN
//! ```
//!
//! ### Tick
//! ```text
//! interval fires
//!   ├─ guard busy ─► ticks_skipped_total += 1, TickSkipped
//!   └─ guard free:
//!        ├─► read (read_retry)          ── Err ─► reading_errors_total, Error{Read}
//!        ├─► evaluate(reading, thresholds snapshot)
//!        ├─► reconcile: display │ leds │ relay │ servo   (concurrent, retried)
//!        ├─► commit state (version + 1)
//!        ├─► record metrics, push to sink if allowed
//!        └─► Reading ─► Alerts (if any) ─► Error per failed actuator
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Loop**          | Start/stop, manual ticks, read-back of alerts and outputs.    | [`Monitor`], [`MonitorBuilder`]             |
//! | **Evaluation**    | Pure threshold checks with inclusive boundaries.              | [`evaluate`], [`ThresholdConfig`]           |
//! | **Actuation**     | Minimal-diff reconciliation, per-actuator retries.            | [`ActuatorOrchestrator`], [`ActuatorState`] |
//! | **Policies**      | Attempt budget, linear backoff, optional jitter.              | [`RetryPolicy`], [`BackoffPolicy`]          |
//! | **Metrics**       | Per-monitor Prometheus registry with text export.             | [`MetricsEmitter`]                          |
//! | **Rate limiting** | Keyed sliding window, fails open on store errors.             | [`SlidingWindowLimiter`], [`WindowStore`]   |
//! | **Events**        | Broadcast bus, push subscribers with bounded queues.          | [`Event`], [`Subscribe`], [`LogWriter`]     |
//! | **Errors**        | Tagged errors classified by kind, never by message text.      | [`MonitorError`], [`ErrorKind`]             |
//! | **Configuration** | Serde/TOML config with validation.                            | [`MonitorConfig`]                           |
//!
//! ## Example
//! ```rust
//! use envisor::{evaluate, AlertKind, Reading, Severity, ThresholdConfig};
//!
//! let reading = Reading::now(35.0, 50.0, 1013.0, 80.0);
//! let alerts = evaluate(&reading, &ThresholdConfig::default());
//!
//! assert_eq!(alerts.len(), 1);
//! assert_eq!(alerts[0].kind, AlertKind::Temperature);
//! assert_eq!(alerts[0].severity, Severity::Danger);
//! assert_eq!(envisor::servo_angle(reading.humidity, 180), 90);
//! ```
mod config;
mod core;
mod error;
mod evaluate;
mod events;
mod limiter;
mod metrics;
mod model;
mod policies;
mod ports;
mod subscribers;

// ---- Public re-exports ----

pub use config::{ActuatorConfig, MetricsConfig, MonitorConfig, RetrySettings};
pub use self::core::{
    ActuatorFailure, ActuatorOrchestrator, Actuators, Monitor, MonitorBuilder, Reconciliation,
    TickReport, run_with_retry, servo_angle, wait_for_shutdown_signal,
};
pub use error::{ActuatorKind, ErrorKind, MonitorError, Stage};
pub use evaluate::evaluate;
pub use events::{Bus, Event, EventKind};
pub use limiter::{Decision, MemoryStore, SlidingWindowLimiter, WindowStore};
pub use metrics::{CounterSnapshot, MetricsEmitter};
pub use model::{
    ActuatorState, AirQualityThresholds, Alert, AlertKind, DisplayFrame, LedColor, Range, Reading,
    Severity, ThresholdConfig,
};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use ports::{
    DisplayActuator, LedActuator, MetricsSink, RelayActuator, SensorReader, ServoActuator,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
