//! # Monitor: the loop controller.
//!
//! [`Monitor`] owns one monitoring loop: the interval timer, the single-flight
//! guard, the shared state, the metrics registry and the event fan-out.
//!
//! ## Lifecycle
//! ```text
//!            start(interval)                 stop()
//!   Idle ─────────────────────► Running ─────────────────► Idle
//!                                 │  ▲
//!                    interval fire│  │tick settled
//!                                 ▼  │
//!                     guard free? ── yes ─► spawn tick (holds guard)
//!                                 └─ no  ─► ticks_skipped_total += 1, TickSkipped
//! ```
//!
//! ## Rules
//! - `start` fails with [`MonitorError::AlreadyRunning`] while a loop is active.
//! - The first tick fires immediately; then one per `interval`. Late fires are
//!   delayed, not bunched.
//! - `stop` cancels the wait, never a tick: it returns once the loop task has
//!   exited **and** any in-flight tick (retries included) has settled. Idempotent.
//! - Getters return owned copies; nothing returned aliases loop state.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use envisor::{LogWriter, Monitor, MonitorConfig};
//! # use envisor::{DisplayActuator, LedActuator, RelayActuator, SensorReader, ServoActuator};
//! # async fn demo(
//! #     sensor: Arc<dyn SensorReader>, display: Arc<dyn DisplayActuator>, leds: Arc<dyn LedActuator>,
//! #     relay: Arc<dyn RelayActuator>, servo: Arc<dyn ServoActuator>,
//! # ) -> Result<(), envisor::MonitorError> {
//!
//! let monitor = Monitor::builder(MonitorConfig::default())
//!     .sensor(sensor)
//!     .display(display)
//!     .leds(leds)
//!     .relay(relay)
//!     .servo(servo)
//!     .with_subscribers(vec![Arc::new(LogWriter::new())])
//!     .build()?;
//!
//! monitor.start(Duration::from_secs(5))?;
//! tokio::time::sleep(Duration::from_secs(60)).await;
//! println!("{}", monitor.get_metrics()?);
//! monitor.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    config::MonitorConfig,
    core::{
        builder::MonitorBuilder,
        shutdown,
        tick::{TickPipeline, TickReport},
    },
    error::MonitorError,
    events::{Bus, Event, EventKind},
    metrics::CounterSnapshot,
    model::{ActuatorState, Alert, ThresholdConfig},
    subscribers::SubscriberSet,
};

struct LoopHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

struct Fanout {
    subs: Arc<SubscriberSet>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// A running (or startable) monitoring loop.
///
/// Dropping a monitor cancels its loop and listener without waiting; use
/// [`shutdown`](Self::shutdown) to wait for the last tick and drain subscribers.
pub struct Monitor {
    pipeline: Arc<TickPipeline>,
    bus: Bus,
    fanout: Mutex<Option<Fanout>>,
    interval: Duration,
    active: Mutex<Option<LoopHandle>>,
}

impl Monitor {
    /// Starts building a monitor from `config`.
    pub fn builder(config: MonitorConfig) -> MonitorBuilder {
        MonitorBuilder::new(config)
    }

    pub(crate) fn new_internal(
        pipeline: Arc<TickPipeline>,
        bus: Bus,
        subs: SubscriberSet,
        interval: Duration,
    ) -> Self {
        let subs = Arc::new(subs);
        let token = CancellationToken::new();
        let task = tokio::spawn(subscriber_listener(
            bus.subscribe(),
            Arc::clone(&subs),
            token.clone(),
        ));
        Self {
            pipeline,
            bus,
            fanout: Mutex::new(Some(Fanout { subs, token, task })),
            interval,
            active: Mutex::new(None),
        }
    }

    /// Begins periodic ticking every `interval` (a zero interval is raised to 1ms).
    pub fn start(&self, interval: Duration) -> Result<(), MonitorError> {
        let mut slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|h| !h.task.is_finished()) {
            return Err(MonitorError::AlreadyRunning);
        }

        let interval = interval.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            Arc::clone(&self.pipeline),
            interval,
            token.clone(),
        ));
        *slot = Some(LoopHandle { token, task });

        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        info!(interval_ms = ms, "monitor started");
        self.bus
            .publish(Event::new(EventKind::Started).with_interval_ms(ms));
        Ok(())
    }

    /// Stops scheduling ticks and waits for the loop to become idle.
    ///
    /// Safe to call mid-tick and more than once.
    pub async fn stop(&self) {
        let handle = {
            let mut slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            slot.take()
        };
        let Some(LoopHandle { token, task }) = handle else {
            return;
        };

        token.cancel();
        if let Err(e) = task.await {
            warn!(error = %e, "monitor loop task ended abnormally");
        }
        self.pipeline.wait_idle().await;

        info!("monitor stopped");
        self.bus.publish(Event::new(EventKind::Stopped));
    }

    /// `true` while a loop started by [`start`](Self::start) is active.
    pub fn is_running(&self) -> bool {
        let slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().is_some_and(|h| !h.task.is_finished())
    }

    /// Runs one tick right now through the same single-flight guard.
    ///
    /// Returns `None` (and counts a skipped tick) if a tick is already in flight.
    pub async fn tick_now(&self) -> Option<TickReport> {
        match self.pipeline.try_begin() {
            Some(permit) => Some(self.pipeline.run(permit).await),
            None => {
                self.pipeline.skip();
                None
            }
        }
    }

    /// Atomically replaces the thresholds; takes effect on the next tick.
    ///
    /// Invalid configs are rejected and nothing is changed.
    pub fn update_thresholds(&self, cfg: ThresholdConfig) -> Result<(), MonitorError> {
        cfg.validate()?;
        info!(?cfg, "thresholds updated");
        self.pipeline.state.replace_thresholds(cfg);
        Ok(())
    }

    /// Copy of the thresholds currently in effect.
    pub fn thresholds(&self) -> ThresholdConfig {
        (*self.pipeline.state.thresholds()).clone()
    }

    /// Alerts computed by the last successful read.
    pub fn get_alerts(&self) -> Vec<Alert> {
        self.pipeline.state.snapshot().alerts.to_vec()
    }

    /// Last successfully applied actuator view.
    pub fn get_output_status(&self) -> ActuatorState {
        self.pipeline.state.snapshot().actuators.clone()
    }

    /// Version of the committed state; +1 per tick that reached the actuators.
    pub fn state_version(&self) -> u64 {
        self.pipeline.state.snapshot().version
    }

    /// Prometheus text exposition of this monitor's registry.
    pub fn get_metrics(&self) -> Result<String, MonitorError> {
        self.pipeline.metrics.export()
    }

    /// Current counter values.
    pub fn counters(&self) -> CounterSnapshot {
        self.pipeline.metrics.counters()
    }

    /// Polling receiver for every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Interval configured in [`MonitorConfig::interval_ms`].
    pub fn configured_interval(&self) -> Duration {
        self.interval
    }

    /// Starts the loop and stops it on a termination signal.
    pub async fn run_until_shutdown(&self, interval: Duration) -> Result<(), MonitorError> {
        self.start(interval)?;
        if let Err(e) = shutdown::wait_for_shutdown_signal().await {
            warn!(error = %e, "signal registration failed; stopping");
        }
        self.stop().await;
        Ok(())
    }

    /// Stops the loop, flushes the event listener and drains subscriber workers.
    pub async fn shutdown(self) {
        self.stop().await;

        let fanout = {
            let mut slot = self.fanout.lock().unwrap_or_else(PoisonError::into_inner);
            slot.take()
        };
        let Some(Fanout { subs, token, task }) = fanout else {
            return;
        };
        token.cancel();
        if let Err(e) = task.await {
            warn!(error = %e, "event listener ended abnormally");
        }
        match Arc::try_unwrap(subs) {
            Ok(set) => set.shutdown().await,
            Err(_) => warn!("subscriber set still shared; workers not drained"),
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(h) = active.as_ref() {
            h.token.cancel();
        }
        let fanout = self.fanout.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(f) = fanout.as_ref() {
            f.token.cancel();
        }
    }
}

/// Forwards bus events to the push subscribers until cancelled, then flushes the backlog.
async fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: Arc<SubscriberSet>,
    token: CancellationToken,
) {
    use broadcast::error::{RecvError, TryRecvError};

    loop {
        tokio::select! {
            biased;
            res = rx.recv() => match res {
                Ok(ev) => set.emit_arc(Arc::new(ev)),
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "event listener lagged"),
                Err(RecvError::Closed) => return,
            },
            _ = token.cancelled() => break,
        }
    }
    loop {
        match rx.try_recv() {
            Ok(ev) => set.emit_arc(Arc::new(ev)),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return,
        }
    }
}

async fn run_loop(pipeline: Arc<TickPipeline>, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match pipeline.try_begin() {
            Some(permit) => {
                let p = Arc::clone(&pipeline);
                in_flight = Some(tokio::spawn(async move {
                    p.run(permit).await;
                }));
            }
            None => pipeline.skip(),
        }
    }

    if let Some(task) = in_flight {
        if let Err(e) = task.await {
            warn!(error = %e, "tick task ended abnormally");
        }
    }
}
