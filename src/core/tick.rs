//! # One tick of the monitoring pipeline.
//!
//! ```text
//! TickPipeline::run(permit)
//!   ├─► thresholds = state.thresholds()                 (snapshot captured once)
//!   ├─► read      sensor.read, through run_with_retry when read_retry allows >1 attempt
//!   │      └─ Err ─► metrics.record_tick(None) ─► Error{Read} ─► return
//!   ├─► evaluate  evaluate(reading, thresholds)
//!   ├─► actuate   orchestrator.reconcile(reading, alerts, previous)
//!   ├─► commit    state.commit(alerts, new_state)       (version + 1)
//!   ├─► metrics   metrics.record_tick(..) ─► sink push (rate limited)
//!   └─► emit      Reading ─► Alerts (if any) ─► Error per failure
//! ```
//!
//! The single-flight guard is an `Arc<Mutex<()>>` acquired with `try_lock_owned`;
//! whoever holds the permit owns the tick. A failed `try_begin` is a skipped tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    core::{
        executor::run_with_retry,
        orchestrator::{ActuatorFailure, ActuatorOrchestrator},
        state::StateCell,
    },
    error::{ActuatorKind, MonitorError, Stage},
    evaluate::evaluate,
    events::{Bus, Event, EventKind},
    limiter::{Decision, SlidingWindowLimiter},
    metrics::MetricsEmitter,
    model::{Alert, Reading},
    policies::RetryPolicy,
    ports::{MetricsSink, SensorReader},
};

/// Limiter key used for metrics sink pushes.
pub(crate) const SINK_KEY: &str = "metrics_sink";

/// What one tick did.
#[derive(Debug)]
pub struct TickReport {
    /// `None` when the sensor read failed.
    pub reading: Option<Reading>,
    /// Alerts computed this tick (empty on a failed read).
    pub alerts: Arc<[Alert]>,
    /// The read error, if the read failed.
    pub read_error: Option<MonitorError>,
    /// Actuator writes that failed after retries.
    pub actuator_failures: Vec<ActuatorFailure>,
    /// State version committed by this tick (unchanged on a failed read).
    pub state_version: u64,
    /// Time from the start of the tick until its events were published.
    pub duration: Duration,
}

impl TickReport {
    /// `true` if the read and every actuator write succeeded.
    pub fn is_clean(&self) -> bool {
        self.read_error.is_none() && self.actuator_failures.is_empty()
    }
}

/// Optional metrics push target with its throttle.
pub(crate) struct SinkBinding {
    pub sink: Arc<dyn MetricsSink>,
    pub throttle: Option<(usize, Duration)>,
    pub limiter: SlidingWindowLimiter,
}

/// Everything a tick needs; shared between the loop task and manual ticks.
pub(crate) struct TickPipeline {
    pub sensor: Arc<dyn SensorReader>,
    pub read_retry: RetryPolicy,
    pub orchestrator: ActuatorOrchestrator,
    pub metrics: MetricsEmitter,
    pub sink: Option<SinkBinding>,
    pub state: StateCell,
    pub bus: Bus,
    guard: Arc<Mutex<()>>,
}

impl TickPipeline {
    pub fn new(
        sensor: Arc<dyn SensorReader>,
        read_retry: RetryPolicy,
        orchestrator: ActuatorOrchestrator,
        metrics: MetricsEmitter,
        sink: Option<SinkBinding>,
        state: StateCell,
        bus: Bus,
    ) -> Self {
        Self {
            sensor,
            read_retry,
            orchestrator,
            metrics,
            sink,
            state,
            bus,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Claims the single-flight guard, or `None` if a tick is in flight.
    pub fn try_begin(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.guard).try_lock_owned().ok()
    }

    /// Waits until no tick is in flight.
    pub async fn wait_idle(&self) {
        let _permit = self.guard.lock().await;
    }

    /// Counts and announces a dropped tick.
    pub fn skip(&self) {
        debug!("previous tick still running; skipping");
        self.metrics.record_skipped_tick();
        self.bus.publish(Event::new(EventKind::TickSkipped));
    }

    /// Runs the pipeline. The permit is released when the tick is fully settled.
    pub async fn run(&self, _permit: OwnedMutexGuard<()>) -> TickReport {
        let started = Instant::now();
        let thresholds = self.state.thresholds();

        let read = if self.read_retry.attempts() > 1 {
            run_with_retry("sensor_read", &self.read_retry, |_| self.sensor.read()).await
        } else {
            self.sensor.read().await
        };
        let reading = match read {
            Ok(r) => r,
            Err(err) => {
                warn!(error = %err, "sensor read failed; skipping evaluate and actuate");
                self.metrics.record_tick(None, started.elapsed(), &[], &[]);
                let export_err = self.push_metrics().await;

                self.bus.publish(Event::error(Stage::Read, &err));
                if let Some(e) = export_err {
                    self.bus.publish(Event::error(Stage::Export, &e));
                }
                return TickReport {
                    reading: None,
                    alerts: Arc::from(Vec::new()),
                    read_error: Some(err),
                    actuator_failures: Vec::new(),
                    state_version: self.state.snapshot().version,
                    duration: started.elapsed(),
                };
            }
        };

        let alerts: Arc<[Alert]> = evaluate(&reading, &thresholds).into();
        let previous = self.state.snapshot();
        let rec = self
            .orchestrator
            .reconcile(&reading, &alerts, &previous.actuators)
            .await;
        let version = self.state.commit(Arc::clone(&alerts), rec.state);

        let failed: Vec<ActuatorKind> = rec.failures.iter().map(|f| f.actuator).collect();
        self.metrics
            .record_tick(Some(&reading), started.elapsed(), &alerts, &failed);
        let export_err = self.push_metrics().await;

        self.bus.publish(Event::reading(reading.clone()));
        if !alerts.is_empty() {
            self.bus.publish(Event::alerts(Arc::clone(&alerts)));
        }
        for failure in &rec.failures {
            self.bus
                .publish(Event::error(Stage::Actuate(failure.actuator), &failure.error));
        }
        if let Some(e) = export_err {
            self.bus.publish(Event::error(Stage::Export, &e));
        }

        let duration = started.elapsed();
        if !alerts.is_empty() || !rec.failures.is_empty() {
            info!(
                version,
                alerts = alerts.len(),
                actuator_failures = rec.failures.len(),
                duration_ms = duration.as_millis() as u64,
                "tick finished"
            );
        } else {
            debug!(version, duration_ms = duration.as_millis() as u64, "tick finished");
        }

        TickReport {
            reading: Some(reading),
            alerts,
            read_error: None,
            actuator_failures: rec.failures,
            state_version: version,
            duration,
        }
    }

    /// Pushes the exposition to the sink if one is bound and the limiter allows it.
    async fn push_metrics(&self) -> Option<MonitorError> {
        let binding = self.sink.as_ref()?;
        if let Some((limit, window)) = binding.throttle {
            if let Decision::Denied { retry_after } = binding.limiter.check(SINK_KEY, limit, window) {
                debug!(retry_after_ms = retry_after.as_millis() as u64, "metrics push throttled");
                return None;
            }
        }

        let result = match self.metrics.export() {
            Ok(text) => binding.sink.publish(&text).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "metrics push failed");
                Some(e)
            }
        }
    }
}
