//! # LogWriter: renders events as `tracing` records.
//!
//! Tick and lifecycle events go out at `info`/`debug`, problems at `warn`/`error`.
//! Install any `tracing` subscriber (e.g. `tracing-subscriber` with `EnvFilter`) to see them.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  envisor::subscribers::log: monitor started interval_ms=5000
//! DEBUG envisor::subscribers::log: reading summary="T 22.5C  H 45%  P 1013hPa  AQ 80"
//! WARN  envisor::subscribers::log: alerts count=1 first="[danger] Temperature high: 35.0C (max 30.0C)"
//! ERROR envisor::subscribers::log: tick stage failed stage="actuate" error="output_error" ...
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event-to-log subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::Started => {
                info!(seq = e.seq, interval_ms = e.interval_ms, "monitor started");
            }
            EventKind::Stopped => info!(seq = e.seq, "monitor stopped"),
            EventKind::TickSkipped => debug!(seq = e.seq, "tick skipped"),
            EventKind::Reading => {
                if let Some(r) = &e.reading {
                    debug!(seq = e.seq, summary = %r.summary(), "reading");
                }
            }
            EventKind::Alerts => {
                let alerts = e.alerts.as_deref().unwrap_or(&[]);
                warn!(
                    seq = e.seq,
                    count = alerts.len(),
                    first = %alerts.first().map(ToString::to_string).unwrap_or_default(),
                    "alerts"
                );
            }
            EventKind::Error => {
                let stage = e.stage.map(|s| s.as_label()).unwrap_or("unknown");
                let detail = match e.stage {
                    Some(crate::error::Stage::Actuate(a)) => a.as_label(),
                    _ => "",
                };
                error!(
                    seq = e.seq,
                    stage,
                    actuator = detail,
                    error = e.error_label.unwrap_or("unknown"),
                    reason,
                    "tick stage failed"
                );
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = e.subscriber.unwrap_or("unknown"), reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = e.subscriber.unwrap_or("unknown"), reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
