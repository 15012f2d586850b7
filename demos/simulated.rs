//! # Example: Simulated greenhouse
//!
//! Runs the monitor against an in-memory sensor whose readings drift randomly,
//! with actuators that just log what they are asked to do. Every fourth relay
//! write fails once to show the retry path.
//!
//! ```text
//! RUST_LOG=envisor=debug,simulated=info cargo run --example simulated
//! ```
//!
//! Stops after 30 seconds or on Ctrl-C, then prints the metrics exposition.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use envisor::{
    ActuatorKind, DisplayActuator, DisplayFrame, LedActuator, LedColor, LogWriter, Monitor,
    MonitorConfig, MonitorError, Reading, RelayActuator, SensorReader, ServoActuator,
};

/// Random walk around comfortable conditions.
struct DriftingSensor {
    last: Mutex<(f64, f64, f64, f64)>,
}

#[async_trait]
impl SensorReader for DriftingSensor {
    async fn read(&self) -> Result<Reading, MonitorError> {
        let mut rng = rand::rng();
        if rng.random_ratio(1, 20) {
            return Err(MonitorError::sensor("i2c read timed out"));
        }
        let mut last = self
            .last
            .lock()
            .map_err(|_| MonitorError::sensor("sensor state poisoned"))?;
        last.0 += rng.random_range(-1.5..1.5);
        last.1 = (last.1 + rng.random_range(-4.0..4.0)).clamp(0.0, 100.0);
        last.2 += rng.random_range(-0.5..0.5);
        last.3 = (last.3 + rng.random_range(-8.0..8.0)).clamp(0.0, 100.0);
        Ok(Reading::now(last.0, last.1, last.2, last.3))
    }
}

struct Screen;

#[async_trait]
impl DisplayActuator for Screen {
    async fn apply(&self, frame: &DisplayFrame) -> Result<(), MonitorError> {
        info!(lines = ?frame.lines, "display");
        Ok(())
    }
}

struct Strip;

#[async_trait]
impl LedActuator for Strip {
    async fn apply(&self, slots: &[LedColor]) -> Result<(), MonitorError> {
        let rgb: Vec<_> = slots.iter().map(|c| c.rgb()).collect();
        info!(?rgb, "leds");
        Ok(())
    }
}

#[derive(Default)]
struct FlakyRelay {
    writes: AtomicU32,
}

#[async_trait]
impl RelayActuator for FlakyRelay {
    async fn apply(&self, channel: usize, on: bool) -> Result<(), MonitorError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) % 4 == 0 {
            return Err(MonitorError::output(ActuatorKind::Relay, "contact bounce"));
        }
        info!(channel, on, "relay");
        Ok(())
    }
}

struct Vent;

#[async_trait]
impl ServoActuator for Vent {
    async fn apply(&self, channel: usize, angle: i32) -> Result<(), MonitorError> {
        info!(channel, angle, "servo");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cfg = MonitorConfig::default();
    cfg.interval_ms = 1_000;
    cfg.metrics.namespace = Some("greenhouse".into());

    let monitor = Monitor::builder(cfg)
        .sensor(Arc::new(DriftingSensor {
            last: Mutex::new((24.0, 55.0, 1013.0, 70.0)),
        }))
        .display(Arc::new(Screen))
        .leds(Arc::new(Strip))
        .relay(Arc::new(FlakyRelay::default()))
        .servo(Arc::new(Vent))
        .with_subscribers(vec![Arc::new(LogWriter::new())])
        .build()?;

    monitor.start(monitor.configured_interval())?;
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(30)) => {}
        res = envisor::wait_for_shutdown_signal() => res?,
    }
    monitor.stop().await;

    println!("{}", monitor.get_metrics()?);
    println!("outputs: {:?}", monitor.get_output_status());
    monitor.shutdown().await;
    Ok(())
}
