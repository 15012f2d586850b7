//! Monitor events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to what the monitoring loop does.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the loop (`Started`/`Stopped`/`TickSkipped`), the tick
//!   pipeline (`Reading`/`Alerts`/`Error`), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the monitor's listener task (fans out to `SubscriberSet`) and
//!   any polling receiver obtained from `Monitor::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
