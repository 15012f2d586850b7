//! # Actuator orchestrator: reconcile hardware with the latest reading.
//!
//! Computes the desired actuator state from a reading and its alerts, diffs it
//! against the previous [`ActuatorState`], and issues only the writes needed.
//!
//! ## Desired state
//! ```text
//! display  alerts? ──► one line per alert       : summary line          (skip if unchanged)
//! leds     one slot per alert, Red/Amber        : all off               (skip if unchanged)
//! relay    AirQuality alert ──► ventilation on  : leave as is           (skip if already on)
//! servo    round(humidity / 100 × max_angle)                            (always written)
//! ```
//!
//! ## Architecture
//! ```text
//! reconcile(reading, alerts, previous)
//!     │
//!     ├──► display write ──► run_with_retry ─┐
//!     ├──► led write     ──► run_with_retry ─┤   (concurrent, independent)
//!     ├──► relay write   ──► run_with_retry ─┤
//!     └──► servo write   ──► run_with_retry ─┘
//!                                            ▼
//!                         merge (single-threaded, after all settle)
//!                          ├─ Applied / Skipped ─► take desired component
//!                          └─ Failed            ─► keep previous component, record failure
//! ```
//!
//! ## Rules
//! - A failing actuator never blocks its siblings; all four are attempted.
//! - The returned state never claims a write that did not succeed.
//! - Partial success is a normal outcome: failures come back in
//!   [`Reconciliation::failures`], not as an `Err`.
//! - No auto-off for the ventilation relay; off transitions are operator actions.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    config::ActuatorConfig,
    core::executor::run_with_retry,
    error::{ActuatorKind, MonitorError},
    model::{ActuatorState, Alert, AlertKind, DisplayFrame, LedColor, Reading},
    policies::RetryPolicy,
    ports::{DisplayActuator, LedActuator, RelayActuator, ServoActuator},
};

/// One actuator write that did not succeed.
#[derive(Debug)]
pub struct ActuatorFailure {
    pub actuator: ActuatorKind,
    pub error: MonitorError,
}

/// Result of one reconciliation cycle.
#[derive(Debug)]
pub struct Reconciliation {
    /// State after merging every successful write.
    pub state: ActuatorState,
    /// Failed writes, in reconciliation order; empty on full success.
    pub failures: Vec<ActuatorFailure>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Handles to the four actuator families.
#[derive(Clone)]
pub struct Actuators {
    pub display: Arc<dyn DisplayActuator>,
    pub leds: Arc<dyn LedActuator>,
    pub relay: Arc<dyn RelayActuator>,
    pub servo: Arc<dyn ServoActuator>,
}

/// Outcome of a single actuator step.
enum Step {
    /// Hardware already matches the desired value.
    Skipped,
    Applied,
    Failed(MonitorError),
}

impl Step {
    fn from_result(res: Result<(), MonitorError>) -> Self {
        match res {
            Ok(()) => Step::Applied,
            Err(e) => Step::Failed(e),
        }
    }
}

/// Servo angle for a humidity percentage, clamped to `[0, max_angle]`.
///
/// # Example
/// ```
/// assert_eq!(envisor::servo_angle(50.0, 180), 90);
/// assert_eq!(envisor::servo_angle(33.0, 180), 59);
/// assert_eq!(envisor::servo_angle(140.0, 180), 180);
/// ```
pub fn servo_angle(humidity: f64, max_angle: i32) -> i32 {
    let fraction = humidity.clamp(0.0, 100.0) / 100.0;
    (fraction * f64::from(max_angle)).round() as i32
}

/// Drives the actuators towards the state implied by the latest reading.
pub struct ActuatorOrchestrator {
    actuators: Actuators,
    layout: ActuatorConfig,
    retry: RetryPolicy,
}

impl ActuatorOrchestrator {
    pub fn new(actuators: Actuators, layout: ActuatorConfig, retry: RetryPolicy) -> Self {
        Self {
            actuators,
            layout,
            retry,
        }
    }

    /// State of freshly powered hardware for this layout.
    pub fn initial_state(&self) -> ActuatorState {
        ActuatorState::initial(self.layout.relay_count, self.layout.servo_count)
    }

    /// Reconciles the actuators with `reading` / `alerts`, starting from `previous`.
    ///
    /// Never returns an error: failures are reported per actuator in the result.
    pub async fn reconcile(
        &self,
        reading: &Reading,
        alerts: &[Alert],
        previous: &ActuatorState,
    ) -> Reconciliation {
        let frame = if alerts.is_empty() {
            DisplayFrame::summary(reading.summary())
        } else {
            DisplayFrame::from_alerts(alerts)
        };
        let slots: Vec<LedColor> = alerts
            .iter()
            .take(self.layout.led_slots)
            .map(|a| LedColor::for_severity(a.severity))
            .collect();
        let vent = self.layout.ventilation_relay;
        let force_vent = alerts.iter().any(|a| a.kind == AlertKind::AirQuality);
        let servo_channel = self.layout.humidity_servo;
        let angle = servo_angle(reading.humidity, self.layout.servo_max_angle);

        let display_fut = async {
            if previous.display_active && previous.display == frame {
                return Step::Skipped;
            }
            Step::from_result(
                run_with_retry("display", &self.retry, |_| self.actuators.display.apply(&frame))
                    .await,
            )
        };
        let leds_fut = async {
            if previous.led_slots == slots && previous.leds_active == !slots.is_empty() {
                return Step::Skipped;
            }
            Step::from_result(
                run_with_retry("leds", &self.retry, |_| self.actuators.leds.apply(&slots)).await,
            )
        };
        let relay_fut = async {
            if !force_vent || previous.relay(vent) {
                return Step::Skipped;
            }
            Step::from_result(
                run_with_retry("relay", &self.retry, |_| self.actuators.relay.apply(vent, true))
                    .await,
            )
        };
        let servo_fut = async {
            Step::from_result(
                run_with_retry("servo", &self.retry, |_| {
                    self.actuators.servo.apply(servo_channel, angle)
                })
                .await,
            )
        };

        let (display, leds, relay, servo) = tokio::join!(display_fut, leds_fut, relay_fut, servo_fut);

        let mut next = previous.clone();
        let mut failures = Vec::new();
        let mut confirmed = false;

        for (actuator, step) in [
            (ActuatorKind::Display, display),
            (ActuatorKind::Leds, leds),
            (ActuatorKind::Relay, relay),
            (ActuatorKind::Servo, servo),
        ] {
            match step {
                Step::Skipped => confirmed = true,
                Step::Applied => {
                    confirmed = true;
                    match actuator {
                        ActuatorKind::Display => {
                            next.display_active = true;
                            next.display = frame.clone();
                        }
                        ActuatorKind::Leds => {
                            next.leds_active = !slots.is_empty();
                            next.led_slots = slots.clone();
                        }
                        ActuatorKind::Relay => set_channel(&mut next.relay_state, vent, true),
                        ActuatorKind::Servo => set_channel(&mut next.servo_angles, servo_channel, angle),
                    }
                }
                Step::Failed(error) => {
                    warn!(actuator = actuator.as_label(), error = %error, "actuator write failed");
                    failures.push(ActuatorFailure { actuator, error });
                }
            }
        }

        if confirmed {
            next.updated_at = Some(reading.taken_at);
        }
        debug!(
            failures = failures.len(),
            relay_forced = force_vent,
            angle,
            "reconciliation finished"
        );

        Reconciliation {
            state: next,
            failures,
        }
    }
}

/// Writes `value` at `channel`, growing the vector if the layout grew since `previous` was built.
fn set_channel<T: Copy + Default>(values: &mut Vec<T>, channel: usize, value: T) {
    if values.len() <= channel {
        values.resize(channel + 1, T::default());
    }
    values[channel] = value;
}
