//! # Metrics emitter.
//!
//! [`MetricsEmitter`] owns a private `prometheus::Registry`, created and dropped
//! with the monitor that owns it. Nothing is registered globally.
//!
//! ## Series
//! ```text
//! readings_total                              counter  successful sensor reads
//! reading_errors_total                        counter  failed sensor reads
//! alerts_triggered_total{kind,severity}       counter
//! actuator_errors_total{actuator}             counter
//! ticks_skipped_total                         counter  ticks dropped by the single-flight guard
//! temperature / humidity / pressure / air_quality   gauges, last seen values
//! tick_duration_seconds                       histogram
//! ```
//! All names take the optional namespace prefix (`<ns>_readings_total`).
//!
//! [`MetricsEmitter::record_tick`] is called at the end of every tick whatever
//! happened upstream; [`MetricsEmitter::export`] renders the text exposition
//! for a scrape endpoint or a [`MetricsSink`](crate::MetricsSink).

use std::time::Duration;

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

use crate::{
    error::{ActuatorKind, MonitorError},
    model::{Alert, Reading},
};

const TICK_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Point-in-time copy of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub readings: u64,
    pub reading_errors: u64,
    pub alerts: u64,
    pub actuator_errors: u64,
    pub skipped_ticks: u64,
}

/// Per-monitor metrics registry.
#[derive(Clone)]
pub struct MetricsEmitter {
    readings_total: IntCounter,
    reading_errors_total: IntCounter,
    alerts_triggered_total: IntCounterVec,
    actuator_errors_total: IntCounterVec,
    ticks_skipped_total: IntCounter,
    temperature: Gauge,
    humidity: Gauge,
    pressure: Gauge,
    air_quality: Gauge,
    tick_duration_seconds: Histogram,
    prefix: String,
    registry: Registry,
}

impl MetricsEmitter {
    /// Creates and registers every series under `namespace` (if any).
    pub fn new(namespace: Option<&str>) -> Result<Self, MonitorError> {
        let registry = Registry::new();
        let opts = |name: &str, help: &str| {
            let o = Opts::new(name, help);
            match namespace {
                Some(ns) => o.namespace(ns),
                None => o,
            }
        };

        let readings_total = IntCounter::with_opts(opts("readings_total", "Successful sensor reads"))?;
        let reading_errors_total =
            IntCounter::with_opts(opts("reading_errors_total", "Failed sensor reads"))?;
        let alerts_triggered_total = IntCounterVec::new(
            opts("alerts_triggered_total", "Alerts raised by kind and severity"),
            &["kind", "severity"],
        )?;
        let actuator_errors_total = IntCounterVec::new(
            opts("actuator_errors_total", "Actuator writes that failed after retries"),
            &["actuator"],
        )?;
        let ticks_skipped_total = IntCounter::with_opts(opts(
            "ticks_skipped_total",
            "Ticks dropped because the previous tick was still running",
        ))?;
        let temperature = Gauge::with_opts(opts("temperature", "Last temperature reading (C)"))?;
        let humidity = Gauge::with_opts(opts("humidity", "Last relative humidity reading (%)"))?;
        let pressure = Gauge::with_opts(opts("pressure", "Last pressure reading (hPa)"))?;
        let air_quality = Gauge::with_opts(opts("air_quality", "Last air quality index"))?;

        let mut hopts = HistogramOpts::new("tick_duration_seconds", "Tick latency in seconds")
            .buckets(TICK_BUCKETS.to_vec());
        if let Some(ns) = namespace {
            hopts = hopts.namespace(ns);
        }
        let tick_duration_seconds = Histogram::with_opts(hopts)?;

        registry.register(Box::new(readings_total.clone()))?;
        registry.register(Box::new(reading_errors_total.clone()))?;
        registry.register(Box::new(alerts_triggered_total.clone()))?;
        registry.register(Box::new(actuator_errors_total.clone()))?;
        registry.register(Box::new(ticks_skipped_total.clone()))?;
        registry.register(Box::new(temperature.clone()))?;
        registry.register(Box::new(humidity.clone()))?;
        registry.register(Box::new(pressure.clone()))?;
        registry.register(Box::new(air_quality.clone()))?;
        registry.register(Box::new(tick_duration_seconds.clone()))?;

        // Every actuator series exists from the start, so a scrape shows 0 rather than nothing.
        for actuator in ActuatorKind::ALL {
            actuator_errors_total.with_label_values(&[actuator.as_label()]);
        }

        Ok(Self {
            readings_total,
            reading_errors_total,
            alerts_triggered_total,
            actuator_errors_total,
            ticks_skipped_total,
            temperature,
            humidity,
            pressure,
            air_quality,
            tick_duration_seconds,
            prefix: namespace.map(|ns| format!("{ns}_")).unwrap_or_default(),
            registry,
        })
    }

    /// Records one finished tick. `reading = None` means the read failed.
    pub fn record_tick(
        &self,
        reading: Option<&Reading>,
        duration: Duration,
        alerts: &[Alert],
        actuator_errors: &[ActuatorKind],
    ) {
        match reading {
            Some(r) => {
                self.readings_total.inc();
                self.temperature.set(r.temperature);
                self.humidity.set(r.humidity);
                self.pressure.set(r.pressure);
                self.air_quality.set(r.air_quality_index);
            }
            None => self.reading_errors_total.inc(),
        }

        for alert in alerts {
            self.alerts_triggered_total
                .with_label_values(&[alert.kind.as_label(), alert.severity.as_label()])
                .inc();
        }
        for actuator in actuator_errors {
            self.actuator_errors_total
                .with_label_values(&[actuator.as_label()])
                .inc();
        }
        self.tick_duration_seconds.observe(duration.as_secs_f64());
    }

    /// Records a tick dropped by the single-flight guard.
    pub fn record_skipped_tick(&self) {
        self.ticks_skipped_total.inc();
    }

    /// Current counter values.
    pub fn counters(&self) -> CounterSnapshot {
        let families = self.registry.gather();
        let sum_family = |name: &str| -> u64 {
            let fq = format!("{}{name}", self.prefix);
            families
                .iter()
                .filter(|mf| mf.get_name() == fq)
                .flat_map(|mf| mf.get_metric().iter())
                .map(|m| m.get_counter().get_value() as u64)
                .sum()
        };
        CounterSnapshot {
            readings: self.readings_total.get(),
            reading_errors: self.reading_errors_total.get(),
            alerts: sum_family("alerts_triggered_total"),
            actuator_errors: sum_family("actuator_errors_total"),
            skipped_ticks: self.ticks_skipped_total.get(),
        }
    }

    /// Renders the Prometheus text exposition.
    pub fn export(&self) -> Result<String, MonitorError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MonitorError::Metrics {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertKind, Severity};

    #[test]
    fn test_successful_tick_updates_gauges_and_counters() {
        let m = MetricsEmitter::new(None).unwrap();
        let reading = Reading::now(35.0, 50.0, 1000.0, 80.0);
        let alerts = vec![Alert::new(AlertKind::Temperature, Severity::Danger, 35.0, "hot")];

        m.record_tick(Some(&reading), Duration::from_millis(12), &alerts, &[ActuatorKind::Servo]);

        let c = m.counters();
        assert_eq!(c.readings, 1);
        assert_eq!(c.reading_errors, 0);
        assert_eq!(c.alerts, 1);
        assert_eq!(c.actuator_errors, 1);

        let text = m.export().unwrap();
        assert!(text.contains("temperature 35"));
        assert!(text.contains(r#"alerts_triggered_total{kind="temperature",severity="danger"} 1"#));
        assert!(text.contains(r#"actuator_errors_total{actuator="servo"} 1"#));
        assert!(text.contains("tick_duration_seconds_count 1"));
    }

    #[test]
    fn test_failed_read_counts_error_only() {
        let m = MetricsEmitter::new(None).unwrap();
        m.record_tick(None, Duration::from_millis(3), &[], &[]);
        m.record_skipped_tick();

        let c = m.counters();
        assert_eq!(c.readings, 0);
        assert_eq!(c.reading_errors, 1);
        assert_eq!(c.skipped_ticks, 1);
    }

    #[test]
    fn test_namespace_prefix() {
        let m = MetricsEmitter::new(Some("greenhouse")).unwrap();
        m.record_tick(None, Duration::ZERO, &[], &[]);
        let text = m.export().unwrap();
        assert!(text.contains("greenhouse_reading_errors_total 1"));
        assert!(text.contains("greenhouse_tick_duration_seconds_bucket"));
    }

    #[test]
    fn test_actuator_series_start_at_zero() {
        let m = MetricsEmitter::new(None).unwrap();
        let text = m.export().unwrap();
        for actuator in ActuatorKind::ALL {
            let line = format!(r#"actuator_errors_total{{actuator="{}"}} 0"#, actuator.as_label());
            assert!(text.contains(&line), "missing {line}");
        }
        assert_eq!(m.counters().actuator_errors, 0);
    }

    #[test]
    fn test_registries_are_independent() {
        let a = MetricsEmitter::new(None).unwrap();
        let b = MetricsEmitter::new(None).unwrap();
        a.record_skipped_tick();
        assert_eq!(a.counters().skipped_ticks, 1);
        assert_eq!(b.counters().skipped_ticks, 0);
    }
}
