//! # Threshold evaluation.
//!
//! [`evaluate`] maps a [`Reading`] and a [`ThresholdConfig`] to an ordered list of
//! [`Alert`]s. Pure: no I/O, no state, same input → same output.
//!
//! ## Rules
//! ```text
//! temperature < min             → Temperature / Warning
//! temperature > max             → Temperature / Danger
//! humidity ∉ [min, max]         → Humidity    / Warning   (one alert either way)
//! air_quality < hazardous_below → AirQuality  / Danger
//! air_quality < poor_below      → AirQuality  / Warning
//! ```
//! Output order is fixed: temperature, humidity, air quality.
//! Boundary values are acceptable and raise nothing.

use crate::model::{Alert, AlertKind, Reading, Severity, ThresholdConfig};

/// Evaluates `reading` against `cfg`.
pub fn evaluate(reading: &Reading, cfg: &ThresholdConfig) -> Vec<Alert> {
    let mut alerts = Vec::with_capacity(3);

    let t = reading.temperature;
    if t < cfg.temperature.min {
        alerts.push(Alert::new(
            AlertKind::Temperature,
            Severity::Warning,
            t,
            format!("Temperature low: {t:.1}C (min {:.1}C)", cfg.temperature.min),
        ));
    } else if t > cfg.temperature.max {
        alerts.push(Alert::new(
            AlertKind::Temperature,
            Severity::Danger,
            t,
            format!("Temperature high: {t:.1}C (max {:.1}C)", cfg.temperature.max),
        ));
    }

    let h = reading.humidity;
    if h < cfg.humidity.min || h > cfg.humidity.max {
        alerts.push(Alert::new(
            AlertKind::Humidity,
            Severity::Warning,
            h,
            format!(
                "Humidity out of range: {h:.0}% ({:.0}-{:.0}%)",
                cfg.humidity.min, cfg.humidity.max
            ),
        ));
    }

    let aq = reading.air_quality_index;
    if aq < cfg.air_quality.hazardous_below {
        alerts.push(Alert::new(
            AlertKind::AirQuality,
            Severity::Danger,
            aq,
            format!("Air quality hazardous: {aq:.0}"),
        ));
    } else if aq < cfg.air_quality.poor_below {
        alerts.push(Alert::new(
            AlertKind::AirQuality,
            Severity::Warning,
            aq,
            format!("Air quality poor: {aq:.0}"),
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirQualityThresholds, Range};

    fn cfg() -> ThresholdConfig {
        ThresholdConfig {
            temperature: Range::new(15.0, 30.0),
            humidity: Range::new(30.0, 70.0),
            air_quality: AirQualityThresholds {
                poor_below: 60.0,
                hazardous_below: 30.0,
            },
        }
    }

    fn reading(t: f64, h: f64, aq: f64) -> Reading {
        Reading::now(t, h, 1013.0, aq)
    }

    #[test]
    fn test_inside_ranges_is_quiet() {
        for (t, h, aq) in [(20.0, 50.0, 80.0), (15.1, 30.1, 60.1), (29.9, 69.9, 500.0)] {
            assert!(evaluate(&reading(t, h, aq), &cfg()).is_empty());
        }
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert!(evaluate(&reading(15.0, 30.0, 60.0), &cfg()).is_empty());
        assert!(evaluate(&reading(30.0, 70.0, 60.0), &cfg()).is_empty());

        // At the hazardous cut-off the air is poor, not hazardous.
        let alerts = evaluate(&reading(20.0, 50.0, 30.0), &cfg());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::AirQuality);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_hot_reading_is_single_danger() {
        let alerts = evaluate(&reading(35.0, 50.0, 80.0), &cfg());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Temperature);
        assert_eq!(alerts[0].severity, Severity::Danger);
        assert_eq!(alerts[0].value, 35.0);
    }

    #[test]
    fn test_cold_reading_warns() {
        let alerts = evaluate(&reading(10.0, 50.0, 80.0), &cfg());
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_humidity_both_directions_warn_once() {
        for h in [10.0, 90.0] {
            let alerts = evaluate(&reading(20.0, h, 80.0), &cfg());
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].kind, AlertKind::Humidity);
            assert_eq!(alerts[0].severity, Severity::Warning);
        }
    }

    #[test]
    fn test_hazardous_air_is_exactly_one_danger() {
        for (t, h) in [(20.0, 50.0), (40.0, 95.0), (0.0, 5.0)] {
            let alerts = evaluate(&reading(t, h, 12.0), &cfg());
            let aq: Vec<_> = alerts
                .iter()
                .filter(|a| a.kind == AlertKind::AirQuality)
                .collect();
            assert_eq!(aq.len(), 1);
            assert_eq!(aq[0].severity, Severity::Danger);
        }
    }

    #[test]
    fn test_poor_air_warns() {
        let alerts = evaluate(&reading(20.0, 50.0, 45.0), &cfg());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_fixed_field_order() {
        let alerts = evaluate(&reading(40.0, 95.0, 10.0), &cfg());
        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::Temperature, AlertKind::Humidity, AlertKind::AirQuality]
        );
    }
}
