use std::time::SystemTime;

/// Immutable environmental snapshot produced once per tick by the sensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Hectopascal.
    pub pressure: f64,
    /// Air quality index; higher is cleaner.
    pub air_quality_index: f64,
    /// When the sensor sampled the values.
    pub taken_at: SystemTime,
}

impl Reading {
    /// Creates a reading stamped with the current wall-clock time.
    pub fn now(temperature: f64, humidity: f64, pressure: f64, air_quality_index: f64) -> Self {
        Self {
            temperature,
            humidity,
            pressure,
            air_quality_index,
            taken_at: SystemTime::now(),
        }
    }

    /// Renders the one-line current-conditions summary shown when nothing is alerting.
    pub fn summary(&self) -> String {
        format!(
            "T {:.1}C  H {:.0}%  P {:.0}hPa  AQ {:.0}",
            self.temperature, self.humidity, self.pressure, self.air_quality_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_format() {
        let r = Reading::now(22.46, 45.2, 1013.25, 80.0);
        assert_eq!(r.summary(), "T 22.5C  H 45%  P 1013hPa  AQ 80");
    }
}
