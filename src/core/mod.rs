//! Runtime core: the loop controller and everything a tick runs.
//!
//! ```text
//! Monitor ──start()──► run_loop ──interval──► TickPipeline::run
//!                                               ├─► SensorReader (executor: read_retry)
//!                                               ├─► evaluate()
//!                                               ├─► ActuatorOrchestrator (executor per actuator)
//!                                               ├─► MetricsEmitter / MetricsSink
//!                                               └─► Bus ──► listener ──► SubscriberSet
//! ```
//!
//! Internal modules:
//! - [`monitor`]: lifecycle, single-flight scheduling, read-back API;
//! - [`builder`]: assembles a monitor from config and ports;
//! - [`tick`]: one read→evaluate→actuate→emit pass;
//! - [`orchestrator`]: diff-based actuator reconciliation;
//! - [`executor`]: retry with linear backoff;
//! - [`state`]: versioned snapshot cells;
//! - [`shutdown`]: OS signal handling.

mod builder;
mod executor;
mod monitor;
mod orchestrator;
mod shutdown;
mod state;
mod tick;

pub use builder::MonitorBuilder;
pub use executor::run_with_retry;
pub use monitor::Monitor;
pub use orchestrator::{ActuatorFailure, ActuatorOrchestrator, Actuators, Reconciliation, servo_angle};
pub use shutdown::wait_for_shutdown_signal;
pub use tick::TickReport;
