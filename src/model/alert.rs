use std::fmt;

/// Which reading field an alert concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Temperature,
    Humidity,
    AirQuality,
}

impl AlertKind {
    pub fn as_label(self) -> &'static str {
        match self {
            AlertKind::Temperature => "temperature",
            AlertKind::Humidity => "humidity",
            AlertKind::AirQuality => "air_quality",
        }
    }
}

/// Alert severity; ordered so that `Danger > Warning`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Danger,
}

impl Severity {
    pub fn as_label(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

/// One threshold violation derived from a reading.
#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    /// The offending reading value.
    pub value: f64,
}

impl Alert {
    pub fn new(kind: AlertKind, severity: Severity, value: f64, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            value,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.as_label(), self.message)
    }
}
