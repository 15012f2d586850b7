//! # Ports: capabilities the monitor consumes from the outside world.
//!
//! ```text
//!   driver ──▶ port trait ──▶ Monitor (core)
//! ```
//!
//! Sensor drivers, actuator bindings and metric sinks implement these traits;
//! the core never touches hardware directly. Every method is async so drivers
//! on a bus or across the network can suspend without blocking the loop.
//!
//! ## Error contract
//! - [`SensorReader::read`] fails with [`MonitorError::Sensor`] (or `Communication`).
//! - Actuators fail with [`MonitorError::Output`] (or `Communication`); a
//!   `Validation` error marks a request the device will never accept and is not retried.
//! - [`MetricsSink::publish`] fails with `Communication`.

use async_trait::async_trait;

use crate::error::MonitorError;
use crate::model::{DisplayFrame, LedColor, Reading};

/// Source of environmental readings.
#[async_trait]
pub trait SensorReader: Send + Sync + 'static {
    /// Samples the sensor once.
    async fn read(&self) -> Result<Reading, MonitorError>;
}

/// Text display.
#[async_trait]
pub trait DisplayActuator: Send + Sync + 'static {
    /// Shows `frame`; an empty frame blanks the display.
    async fn apply(&self, frame: &DisplayFrame) -> Result<(), MonitorError>;
}

/// Row of indicator LEDs.
#[async_trait]
pub trait LedActuator: Send + Sync + 'static {
    /// Lights one LED per slot; an empty slice turns every LED off.
    async fn apply(&self, slots: &[LedColor]) -> Result<(), MonitorError>;
}

/// Bank of relays (ventilation and friends).
#[async_trait]
pub trait RelayActuator: Send + Sync + 'static {
    async fn apply(&self, channel: usize, on: bool) -> Result<(), MonitorError>;
}

/// Hobby servos driven by angle.
#[async_trait]
pub trait ServoActuator: Send + Sync + 'static {
    async fn apply(&self, channel: usize, angle: i32) -> Result<(), MonitorError>;
}

/// Optional destination for the metrics text exposition.
#[async_trait]
pub trait MetricsSink: Send + Sync + 'static {
    async fn publish(&self, exposition: &str) -> Result<(), MonitorError>;
}
