//! Sliding-window rate limiting.
//!
//! ## Contents
//! - [`SlidingWindowLimiter`] the `allow(key, limit, window)` entry point
//! - [`Decision`] outcome of one check (allowed / denied / failed open)
//! - [`WindowStore`] storage seam, [`MemoryStore`] the in-process default
//!
//! ## Quick reference
//! - **Inside the loop**: throttles pushes to the optional `MetricsSink`.
//! - **Standalone**: an API gateway can own a limiter and gate requests per caller/IP.
//!
//! ## Failure policy
//! If the store itself errors the limiter **fails open**: the call is allowed and
//! a warning is logged. Availability is favored over strict enforcement.

mod sliding;
mod store;

pub use sliding::{Decision, SlidingWindowLimiter};
pub use store::{MemoryStore, WindowStore};
