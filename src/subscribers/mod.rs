//! # Push subscribers for monitor events.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//!   tick ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                      │
//!                                     ┌────────────────┼───────────────┐
//!                                     ▼                ▼               ▼
//!                                 LogWriter        dashboard        custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use envisor::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct AlertPager;
//!
//! #[async_trait]
//! impl Subscribe for AlertPager {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::Alerts {
//!             // page the on-call
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "pager"
//!     }
//! }
//! ```

mod log;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
