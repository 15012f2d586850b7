//! Error types used by the monitoring loop and its collaborators.
//!
//! Every failure carries an explicit [`ErrorKind`] set at the point where it is
//! raised. The retry executor classifies on that kind, never on message text.
//!
//! - [`MonitorError`]: the single error enum of the crate.
//! - [`ErrorKind`]: coarse classification used by [`RetryPolicy`](crate::RetryPolicy).
//! - [`ActuatorKind`]: which actuator an output failure belongs to.
//! - [`Stage`]: which pipeline stage of a tick raised the error.
//!
//! All types provide `as_label` for logs/metrics.

use std::fmt;

use thiserror::Error;

/// Coarse classification of a [`MonitorError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Sensor hardware or bus failure on the read path.
    Sensor,
    /// Actuator write failure.
    Output,
    /// Network-adjacent failure (remote sink, gateway, ...).
    Communication,
    /// Bad configuration or input.
    Validation,
    /// Retry budget exhausted.
    OperationFailed,
    /// Lifecycle misuse (e.g. `start` while running).
    Lifecycle,
    /// Metrics registry or exposition failure.
    Metrics,
}

impl ErrorKind {
    /// Default retry classification: hardware and network failures are transient.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::Sensor | ErrorKind::Output | ErrorKind::Communication
        )
    }

    /// Returns a short stable label (snake_case).
    pub fn as_label(self) -> &'static str {
        match self {
            ErrorKind::Sensor => "sensor",
            ErrorKind::Output => "output",
            ErrorKind::Communication => "communication",
            ErrorKind::Validation => "validation",
            ErrorKind::OperationFailed => "operation_failed",
            ErrorKind::Lifecycle => "lifecycle",
            ErrorKind::Metrics => "metrics",
        }
    }
}

/// Physical actuator families driven by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActuatorKind {
    Display,
    Leds,
    Relay,
    Servo,
}

impl ActuatorKind {
    /// All actuators, in reconciliation order.
    pub const ALL: [ActuatorKind; 4] = [
        ActuatorKind::Display,
        ActuatorKind::Leds,
        ActuatorKind::Relay,
        ActuatorKind::Servo,
    ];

    pub fn as_label(self) -> &'static str {
        match self {
            ActuatorKind::Display => "display",
            ActuatorKind::Leds => "leds",
            ActuatorKind::Relay => "relay",
            ActuatorKind::Servo => "servo",
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Pipeline stage of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Read,
    Actuate(ActuatorKind),
    Export,
}

impl Stage {
    pub fn as_label(self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Actuate(_) => "actuate",
            Stage::Export => "export",
        }
    }
}

/// # Errors produced by the monitoring core.
///
/// Nothing here is fatal to the process: the loop reports errors through events
/// and metrics and keeps running. Only construction-time validation failures
/// prevent a monitor from being built.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Sensor read failed.
    #[error("sensor read failed: {reason}")]
    Sensor { reason: String },

    /// Actuator write failed.
    #[error("{actuator} write failed: {reason}")]
    Output {
        actuator: ActuatorKind,
        reason: String,
    },

    /// Network-adjacent failure.
    #[error("communication failed: {reason}")]
    Communication { reason: String },

    /// Configuration or input rejected.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Retry budget exhausted; carries the last error.
    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    OperationFailed {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<MonitorError>,
    },

    /// `start` called while the loop is already active.
    #[error("monitor loop is already running")]
    AlreadyRunning,

    /// Metrics registration or encoding failed.
    #[error("metrics failure: {reason}")]
    Metrics { reason: String },

    /// Configuration file could not be read or parsed.
    #[error("config error: {reason}")]
    Config { reason: String },
}

impl MonitorError {
    /// Shorthand for a sensor failure.
    pub fn sensor(reason: impl Into<String>) -> Self {
        MonitorError::Sensor {
            reason: reason.into(),
        }
    }

    /// Shorthand for an actuator failure.
    pub fn output(actuator: ActuatorKind, reason: impl Into<String>) -> Self {
        MonitorError::Output {
            actuator,
            reason: reason.into(),
        }
    }

    /// Shorthand for a communication failure.
    pub fn communication(reason: impl Into<String>) -> Self {
        MonitorError::Communication {
            reason: reason.into(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        MonitorError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MonitorError::Sensor { .. } => ErrorKind::Sensor,
            MonitorError::Output { .. } => ErrorKind::Output,
            MonitorError::Communication { .. } => ErrorKind::Communication,
            MonitorError::Validation { .. } | MonitorError::Config { .. } => ErrorKind::Validation,
            MonitorError::OperationFailed { .. } => ErrorKind::OperationFailed,
            MonitorError::AlreadyRunning => ErrorKind::Lifecycle,
            MonitorError::Metrics { .. } => ErrorKind::Metrics,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use envisor::{ActuatorKind, MonitorError};
    ///
    /// let err = MonitorError::output(ActuatorKind::Relay, "i2c nack");
    /// assert_eq!(err.as_label(), "output_error");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            MonitorError::Sensor { .. } => "sensor_error",
            MonitorError::Output { .. } => "output_error",
            MonitorError::Communication { .. } => "communication_error",
            MonitorError::Validation { .. } => "validation_error",
            MonitorError::OperationFailed { .. } => "operation_failed",
            MonitorError::AlreadyRunning => "already_running",
            MonitorError::Metrics { .. } => "metrics_error",
            MonitorError::Config { .. } => "config_error",
        }
    }

    /// Indicates whether the error is transient under the default classification.
    ///
    /// # Example
    /// ```
    /// use envisor::MonitorError;
    ///
    /// assert!(MonitorError::sensor("bus timeout").is_retryable());
    /// assert!(!MonitorError::validation("humidity", "min > max").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        self.kind().is_transient()
    }

    /// Returns the innermost error, unwrapping `OperationFailed` layers.
    pub fn root(&self) -> &MonitorError {
        match self {
            MonitorError::OperationFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<prometheus::Error> for MonitorError {
    fn from(e: prometheus::Error) -> Self {
        MonitorError::Metrics {
            reason: e.to_string(),
        }
    }
}
