#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use envisor::{
    ActuatorKind, DisplayActuator, DisplayFrame, Event, LedActuator, LedColor, MetricsSink,
    Monitor, MonitorBuilder, MonitorConfig, MonitorError, Reading, RelayActuator, SensorReader,
    ServoActuator,
};

/// Sensor that replays a script, then repeats `fallback`.
pub struct ScriptedSensor {
    script: Mutex<VecDeque<Result<Reading, MonitorError>>>,
    fallback: Reading,
    delay: Duration,
    pub calls: AtomicU32,
}

impl ScriptedSensor {
    pub fn steady(reading: Reading) -> Arc<Self> {
        Self::scripted(reading, Vec::new())
    }

    pub fn scripted(fallback: Reading, script: Vec<Result<Reading, MonitorError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        })
    }

    pub fn slow(reading: Reading, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: reading,
            delay,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorReader for ScriptedSensor {
    async fn read(&self) -> Result<Reading, MonitorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Actuator mock for all four families: records calls, fails the first `fail_first` writes.
#[derive(Default)]
pub struct MockActuator {
    pub calls: Mutex<Vec<String>>,
    fail_first: AtomicU32,
    always_fail: bool,
}

impl MockActuator {
    pub fn ok() -> Arc<Self> {
        Arc::default()
    }

    pub fn failing_first(n: u32) -> Arc<Self> {
        Arc::new(Self {
            fail_first: AtomicU32::new(n),
            ..Self::default()
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            always_fail: true,
            ..Self::default()
        })
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, actuator: ActuatorKind, call: String) -> Result<(), MonitorError> {
        self.calls.lock().unwrap().push(call);
        if self.always_fail {
            return Err(MonitorError::output(actuator, "bus fault"));
        }
        let left = self.fail_first.load(Ordering::SeqCst);
        if left > 0 {
            self.fail_first.store(left - 1, Ordering::SeqCst);
            return Err(MonitorError::output(actuator, "transient fault"));
        }
        Ok(())
    }
}

#[async_trait]
impl DisplayActuator for MockActuator {
    async fn apply(&self, frame: &DisplayFrame) -> Result<(), MonitorError> {
        self.record(ActuatorKind::Display, frame.lines.join("|"))
    }
}

#[async_trait]
impl LedActuator for MockActuator {
    async fn apply(&self, slots: &[LedColor]) -> Result<(), MonitorError> {
        self.record(ActuatorKind::Leds, format!("{slots:?}"))
    }
}

#[async_trait]
impl RelayActuator for MockActuator {
    async fn apply(&self, channel: usize, on: bool) -> Result<(), MonitorError> {
        self.record(ActuatorKind::Relay, format!("{channel}={on}"))
    }
}

#[async_trait]
impl ServoActuator for MockActuator {
    async fn apply(&self, channel: usize, angle: i32) -> Result<(), MonitorError> {
        self.record(ActuatorKind::Servo, format!("{channel}={angle}"))
    }
}

#[derive(Default)]
pub struct CountingSink {
    pub pushes: AtomicU32,
    pub fail: bool,
}

#[async_trait]
impl MetricsSink for CountingSink {
    async fn publish(&self, exposition: &str) -> Result<(), MonitorError> {
        assert!(exposition.contains("readings_total") || exposition.contains("reading_errors_total"));
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MonitorError::communication("push gateway unreachable"));
        }
        Ok(())
    }
}

pub struct Rig {
    pub sensor: Arc<ScriptedSensor>,
    pub display: Arc<MockActuator>,
    pub leds: Arc<MockActuator>,
    pub relay: Arc<MockActuator>,
    pub servo: Arc<MockActuator>,
}

impl Rig {
    pub fn new(sensor: Arc<ScriptedSensor>) -> Self {
        Self {
            sensor,
            display: MockActuator::ok(),
            leds: MockActuator::ok(),
            relay: MockActuator::ok(),
            servo: MockActuator::ok(),
        }
    }

    pub fn builder(&self, cfg: MonitorConfig) -> MonitorBuilder {
        Monitor::builder(cfg)
            .sensor(self.sensor.clone())
            .display(self.display.clone())
            .leds(self.leds.clone())
            .relay(self.relay.clone())
            .servo(self.servo.clone())
    }

    pub fn monitor(&self) -> Monitor {
        self.builder(test_config()).build().unwrap()
    }
}

/// Defaults with short, deterministic actuator retries.
pub fn test_config() -> MonitorConfig {
    let mut cfg = MonitorConfig::default();
    cfg.actuator_retry.base_delay_ms = 100;
    cfg.actuator_retry.max_delay_ms = 1_000;
    cfg
}

pub fn hot() -> Reading {
    Reading::now(35.0, 50.0, 1013.0, 80.0)
}

pub fn comfortable() -> Reading {
    Reading::now(22.0, 45.0, 1013.0, 80.0)
}

/// Everything currently buffered on a polling receiver.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}
