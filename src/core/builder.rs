use std::sync::Arc;

use crate::{
    config::MonitorConfig,
    core::{
        monitor::Monitor,
        orchestrator::{ActuatorOrchestrator, Actuators},
        state::StateCell,
        tick::{SinkBinding, TickPipeline},
    },
    error::MonitorError,
    events::Bus,
    limiter::SlidingWindowLimiter,
    metrics::MetricsEmitter,
    ports::{DisplayActuator, LedActuator, MetricsSink, RelayActuator, SensorReader, ServoActuator},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for a [`Monitor`]: configuration plus the hardware ports it drives.
///
/// The sensor and all four actuators are required; the metrics sink and
/// subscribers are optional.
pub struct MonitorBuilder {
    cfg: MonitorConfig,
    sensor: Option<Arc<dyn SensorReader>>,
    display: Option<Arc<dyn DisplayActuator>>,
    leds: Option<Arc<dyn LedActuator>>,
    relay: Option<Arc<dyn RelayActuator>>,
    servo: Option<Arc<dyn ServoActuator>>,
    sink: Option<Arc<dyn MetricsSink>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl MonitorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: MonitorConfig) -> Self {
        Self {
            cfg,
            sensor: None,
            display: None,
            leds: None,
            relay: None,
            servo: None,
            sink: None,
            subscribers: Vec::new(),
        }
    }

    pub fn sensor(mut self, sensor: Arc<dyn SensorReader>) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn display(mut self, display: Arc<dyn DisplayActuator>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn leds(mut self, leds: Arc<dyn LedActuator>) -> Self {
        self.leds = Some(leds);
        self
    }

    pub fn relay(mut self, relay: Arc<dyn RelayActuator>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn servo(mut self, servo: Arc<dyn ServoActuator>) -> Self {
        self.servo = Some(servo);
        self
    }

    /// Pushes the metrics exposition here after every tick, throttled by
    /// `metrics.sink_limit` per `metrics.sink_window_ms`.
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets push subscribers. Each gets its own bounded queue and worker.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and assembles the monitor (not yet started).
    ///
    /// Must be called inside a Tokio runtime: the event listener and subscriber
    /// workers are spawned here.
    pub fn build(self) -> Result<Monitor, MonitorError> {
        self.cfg.validate()?;

        let actuators = Actuators {
            display: required(self.display, "display")?,
            leds: required(self.leds, "leds")?,
            relay: required(self.relay, "relay")?,
            servo: required(self.servo, "servo")?,
        };
        let sensor = required(self.sensor, "sensor")?;

        let metrics = MetricsEmitter::new(self.cfg.metrics.namespace.as_deref())?;
        let orchestrator = ActuatorOrchestrator::new(
            actuators,
            self.cfg.actuators.clone(),
            self.cfg.actuator_retry.policy(),
        );
        let state = StateCell::new(self.cfg.thresholds.clone(), orchestrator.initial_state());
        let sink = self.sink.map(|sink| SinkBinding {
            sink,
            throttle: self.cfg.metrics.sink_throttle(),
            limiter: SlidingWindowLimiter::new(),
        });

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let pipeline = Arc::new(TickPipeline::new(
            sensor,
            self.cfg.read_retry.policy(),
            orchestrator,
            metrics,
            sink,
            state,
            bus.clone(),
        ));

        Ok(Monitor::new_internal(
            pipeline,
            bus,
            subs,
            self.cfg.interval(),
        ))
    }
}

fn required<T: ?Sized>(port: Option<Arc<T>>, name: &'static str) -> Result<Arc<T>, MonitorError> {
    port.ok_or_else(|| MonitorError::validation(name, "port not provided"))
}
