//! Domain data model.
//!
//! ## Contents
//! - [`Reading`] immutable sensor snapshot, one per tick
//! - [`ThresholdConfig`] acceptable ranges, replaced wholesale on update
//! - [`Alert`], [`AlertKind`], [`Severity`] derived per tick, never persisted
//! - [`ActuatorState`], [`DisplayFrame`], [`LedColor`] the orchestrator's view of the hardware

mod actuator;
mod alert;
mod reading;
mod thresholds;

pub use actuator::{ActuatorState, DisplayFrame, LedColor};
pub use alert::{Alert, AlertKind, Severity};
pub use reading::Reading;
pub use thresholds::{AirQualityThresholds, Range, ThresholdConfig};
