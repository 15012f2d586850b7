//! # Threshold configuration.
//!
//! [`ThresholdConfig`] is owned by the device owner and handed to the monitor as a
//! whole value. The monitor never edits it in place: an update validates the new
//! value and swaps the shared snapshot, so a tick in flight keeps evaluating the
//! config it captured at tick start.
//!
//! ## Boundaries
//! Ranges are inclusive of "acceptable": `min <= value <= max` raises nothing.
//! Air quality uses "below" thresholds (higher index is cleaner).

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Inclusive acceptable range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, field: &'static str) -> Result<(), MonitorError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(MonitorError::validation(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(MonitorError::validation(
                field,
                format!("min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Air quality cut-offs; readings below `poor_below` warn, below `hazardous_below` are dangerous.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirQualityThresholds {
    pub poor_below: f64,
    pub hazardous_below: f64,
}

/// Thresholds a reading is evaluated against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub temperature: Range,
    pub humidity: Range,
    pub air_quality: AirQualityThresholds,
}

impl Default for ThresholdConfig {
    /// Indoor comfort defaults:
    /// - temperature 15..=30 C
    /// - humidity 30..=70 %
    /// - air quality poor below 60, hazardous below 30
    fn default() -> Self {
        Self {
            temperature: Range::new(15.0, 30.0),
            humidity: Range::new(30.0, 70.0),
            air_quality: AirQualityThresholds {
                poor_below: 60.0,
                hazardous_below: 30.0,
            },
        }
    }
}

impl ThresholdConfig {
    /// Checks the whole config; an invalid value is never partially applied.
    pub fn validate(&self) -> Result<(), MonitorError> {
        self.temperature.validate("temperature")?;
        self.humidity.validate("humidity")?;
        if self.humidity.min < 0.0 || self.humidity.max > 100.0 {
            return Err(MonitorError::validation(
                "humidity",
                "bounds must lie within 0..=100",
            ));
        }

        let aq = &self.air_quality;
        if !aq.poor_below.is_finite() || !aq.hazardous_below.is_finite() {
            return Err(MonitorError::validation(
                "air_quality",
                "thresholds must be finite",
            ));
        }
        if aq.hazardous_below > aq.poor_below {
            return Err(MonitorError::validation(
                "air_quality",
                format!(
                    "hazardous_below {} exceeds poor_below {}",
                    aq.hazardous_below, aq.poor_below
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_is_valid() {
        assert!(ThresholdConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_temperature_rejected() {
        let cfg = ThresholdConfig {
            temperature: Range::new(30.0, 15.0),
            ..ThresholdConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_humidity_out_of_percent_rejected() {
        let cfg = ThresholdConfig {
            humidity: Range::new(10.0, 120.0),
            ..ThresholdConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_air_quality_order_and_nan_rejected() {
        let mut cfg = ThresholdConfig::default();
        cfg.air_quality.hazardous_below = 70.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ThresholdConfig::default();
        cfg.temperature.max = f64::NAN;
        assert!(cfg.validate().is_err());
    }
}
