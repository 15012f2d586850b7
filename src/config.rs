//! # Monitor configuration.
//!
//! [`MonitorConfig`] centralizes every setting of one monitoring loop. It can be
//! built in code (`MonitorConfig::default()` + field edits) or loaded from TOML:
//!
//! ```toml
//! interval_ms = 5000
//! bus_capacity = 256
//!
//! [thresholds.temperature]
//! min = 15.0
//! max = 30.0
//!
//! [actuators]
//! relay_count = 4
//! ventilation_relay = 0
//!
//! [actuator_retry]
//! max_attempts = 3
//! base_delay_ms = 200
//!
//! [metrics]
//! namespace = "greenhouse"
//! ```
//!
//! Missing keys fall back to defaults. [`MonitorConfig::validate`] is run by the
//! builder; an invalid initial config is the only construction-time failure.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `metrics.sink_limit = 0` → sink pushes are not throttled

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::MonitorError,
    model::ThresholdConfig,
    policies::{BackoffPolicy, JitterPolicy, RetryPolicy},
};

/// Top-level configuration of one monitoring loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Tick interval in milliseconds; used by `run_until_shutdown` and demos.
    pub interval_ms: u64,
    /// Capacity of the event bus ring buffer.
    pub bus_capacity: usize,
    /// Initial thresholds.
    pub thresholds: ThresholdConfig,
    /// Actuator layout.
    pub actuators: ActuatorConfig,
    /// Retry policy applied to each actuator write.
    pub actuator_retry: RetrySettings,
    /// Retry policy applied to the sensor read.
    pub read_retry: RetrySettings,
    /// Metrics naming and sink throttling.
    pub metrics: MetricsConfig,
}

impl Default for MonitorConfig {
    /// - `interval_ms = 5000`
    /// - `bus_capacity = 256`
    /// - actuator writes: 3 attempts, 200ms linear backoff
    /// - sensor read: single attempt
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            bus_capacity: 256,
            thresholds: ThresholdConfig::default(),
            actuators: ActuatorConfig::default(),
            actuator_retry: RetrySettings::default(),
            read_retry: RetrySettings {
                max_attempts: 1,
                ..RetrySettings::default()
            },
            metrics: MetricsConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, MonitorError> {
        toml::from_str(s).map_err(|e| MonitorError::Config {
            reason: e.to_string(),
        })
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MonitorError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.interval_ms == 0 {
            return Err(MonitorError::validation("interval_ms", "must be positive"));
        }
        self.thresholds.validate()?;
        self.actuators.validate()?;
        self.actuator_retry.validate("actuator_retry")?;
        self.read_retry.validate("read_retry")?;
        Ok(())
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

/// Actuator layout: channel counts and which channel serves which purpose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub relay_count: usize,
    pub servo_count: usize,
    /// Relay channel driving ventilation.
    pub ventilation_relay: usize,
    /// Servo channel tracking humidity.
    pub humidity_servo: usize,
    /// Servo angle at 100% humidity.
    pub servo_max_angle: i32,
    /// Number of indicator LEDs; alerts beyond this are not shown.
    pub led_slots: usize,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            relay_count: 4,
            servo_count: 1,
            ventilation_relay: 0,
            humidity_servo: 0,
            servo_max_angle: 180,
            led_slots: 8,
        }
    }
}

impl ActuatorConfig {
    fn validate(&self) -> Result<(), MonitorError> {
        if self.ventilation_relay >= self.relay_count {
            return Err(MonitorError::validation(
                "actuators.ventilation_relay",
                format!(
                    "channel {} out of {} relays",
                    self.ventilation_relay, self.relay_count
                ),
            ));
        }
        if self.humidity_servo >= self.servo_count {
            return Err(MonitorError::validation(
                "actuators.humidity_servo",
                format!(
                    "channel {} out of {} servos",
                    self.humidity_servo, self.servo_count
                ),
            ));
        }
        if !(1..=360).contains(&self.servo_max_angle) {
            return Err(MonitorError::validation(
                "actuators.servo_max_angle",
                "must be within 1..=360",
            ));
        }
        Ok(())
    }
}

/// Serializable form of a [`RetryPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: JitterPolicy,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let backoff = BackoffPolicy::default();
        Self {
            max_attempts: 3,
            base_delay_ms: backoff.base.as_millis() as u64,
            max_delay_ms: backoff.max.as_millis() as u64,
            jitter: backoff.jitter,
        }
    }
}

impl RetrySettings {
    fn validate(&self, field: &'static str) -> Result<(), MonitorError> {
        if self.max_attempts == 0 {
            return Err(MonitorError::validation(field, "max_attempts must be at least 1"));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(MonitorError::validation(
                field,
                "max_delay_ms is below base_delay_ms",
            ));
        }
        Ok(())
    }

    /// Builds the runtime policy with the default (transient-kinds) classifier.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: BackoffPolicy {
                base: Duration::from_millis(self.base_delay_ms),
                max: Duration::from_millis(self.max_delay_ms),
                jitter: self.jitter,
            },
            ..RetryPolicy::default()
        }
    }
}

/// Metrics naming and push throttling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Optional prefix, e.g. `greenhouse` → `greenhouse_readings_total`.
    pub namespace: Option<String>,
    /// Max sink pushes per window (`0` = unthrottled).
    pub sink_limit: usize,
    pub sink_window_ms: u64,
}

impl Default for MetricsConfig {
    /// No namespace; at most 6 sink pushes per minute.
    fn default() -> Self {
        Self {
            namespace: None,
            sink_limit: 6,
            sink_window_ms: 60_000,
        }
    }
}

impl MetricsConfig {
    /// Sink throttle as `(limit, window)`, or `None` when unthrottled.
    #[inline]
    pub fn sink_throttle(&self) -> Option<(usize, Duration)> {
        if self.sink_limit == 0 {
            None
        } else {
            Some((self.sink_limit, Duration::from_millis(self.sink_window_ms)))
        }
    }
}
