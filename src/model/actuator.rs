//! # Actuator state.
//!
//! [`ActuatorState`] is the orchestrator's belief about the hardware. It is an
//! owned value: each reconciliation produces a new one and the monitor swaps it
//! in wholesale, so readers never see a half-applied cycle.
//!
//! A component only changes when the matching actuator write succeeded; a failed
//! write leaves that component at its previous value.

use std::time::SystemTime;

use crate::model::{Alert, Severity};

/// Indicator colour of one LED slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedColor {
    Red,
    Amber,
}

impl LedColor {
    /// `danger` → red, `warning` → amber.
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Danger => LedColor::Red,
            Severity::Warning => LedColor::Amber,
        }
    }

    /// RGB triple for drivers that take raw colour.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            LedColor::Red => (255, 0, 0),
            LedColor::Amber => (255, 191, 0),
        }
    }
}

/// Text content pushed to the display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayFrame {
    pub lines: Vec<String>,
}

impl DisplayFrame {
    /// One line per alert, in evaluation order.
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        Self {
            lines: alerts.iter().map(ToString::to_string).collect(),
        }
    }

    /// A single summary line.
    pub fn summary(line: String) -> Self {
        Self { lines: vec![line] }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Last successfully applied view of every actuator.
#[derive(Clone, Debug, PartialEq)]
pub struct ActuatorState {
    pub display_active: bool,
    /// Frame last written to the display.
    pub display: DisplayFrame,
    pub leds_active: bool,
    /// One slot per alert at the time of the last successful LED write.
    pub led_slots: Vec<LedColor>,
    pub relay_state: Vec<bool>,
    pub servo_angles: Vec<i32>,
    /// `taken_at` of the reading whose reconciliation last applied a component.
    pub updated_at: Option<SystemTime>,
}

impl ActuatorState {
    /// All outputs off, `relays` relay channels and `servos` servo channels.
    pub fn initial(relays: usize, servos: usize) -> Self {
        Self {
            display_active: false,
            display: DisplayFrame::default(),
            leds_active: false,
            led_slots: Vec::new(),
            relay_state: vec![false; relays],
            servo_angles: vec![0; servos],
            updated_at: None,
        }
    }

    /// Whether relay `channel` is believed to be on (`false` for unknown channels).
    pub fn relay(&self, channel: usize) -> bool {
        self.relay_state.get(channel).copied().unwrap_or(false)
    }

    /// Believed angle of servo `channel`.
    pub fn servo(&self, channel: usize) -> Option<i32> {
        self.servo_angles.get(channel).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlertKind;

    #[test]
    fn test_initial_state_is_all_off() {
        let s = ActuatorState::initial(2, 1);
        assert!(!s.display_active && !s.leds_active);
        assert_eq!(s.relay_state, vec![false, false]);
        assert_eq!(s.servo_angles, vec![0]);
        assert!(!s.relay(7));
    }

    #[test]
    fn test_frame_from_alerts_keeps_order() {
        let alerts = vec![
            Alert::new(AlertKind::Temperature, Severity::Danger, 35.0, "hot"),
            Alert::new(AlertKind::Humidity, Severity::Warning, 80.0, "humid"),
        ];
        let frame = DisplayFrame::from_alerts(&alerts);
        assert_eq!(frame.lines, vec!["[danger] hot", "[warning] humid"]);
    }

    #[test]
    fn test_led_colour_follows_severity() {
        assert_eq!(LedColor::for_severity(Severity::Danger).rgb(), (255, 0, 0));
        assert_eq!(LedColor::for_severity(Severity::Warning).rgb(), (255, 191, 0));
    }
}
