//! Readings and Alert Events
//!
//! A `Reading` is one synchronized sample of both sensors. It is produced
//! once per cycle by the sensor reader, read by the evaluator and the
//! telemetry formatter, and then dropped. Nothing keeps readings across
//! cycles.
//!
//! An `AlertEvent` records that a reading crossed a configured limit. Only
//! the evaluator creates them.

use core::fmt;

use crate::time::Timestamp;

/// One synchronized heart-rate and temperature sample
///
/// Both fields are always present: the sensor pair is sampled as a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    heart_rate: u16,
    temperature: f32,
    timestamp: Timestamp,
}

impl Reading {
    /// Build a reading from converted values
    pub const fn new(heart_rate: u16, temperature: f32, timestamp: Timestamp) -> Self {
        Self { heart_rate, temperature, timestamp }
    }

    /// Heart rate in beats per minute
    pub const fn heart_rate(&self) -> u16 {
        self.heart_rate
    }

    /// Temperature in degrees Celsius
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Monotonic acquisition time in milliseconds
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Which limit an alert crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertKind {
    /// Heart rate above `heart_rate_limit`
    HighHeartRate = 0,
    /// Temperature above `temperature_limit`
    HighTemperature = 1,
}

impl AlertKind {
    /// Number of alert kinds
    pub const COUNT: usize = 2;

    /// All kinds, in evaluation order
    pub const ALL: [AlertKind; Self::COUNT] = [AlertKind::HighHeartRate, AlertKind::HighTemperature];

    /// Dense index for per-kind tables
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            AlertKind::HighHeartRate => "high heart rate",
            AlertKind::HighTemperature => "high temperature",
        }
    }

    /// Unit of the offending value
    pub const fn unit(&self) -> &'static str {
        match self {
            AlertKind::HighHeartRate => "bpm",
            AlertKind::HighTemperature => "°C",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AlertKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name())
    }
}

/// A reading crossed a safety threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertEvent {
    /// Which limit was crossed
    pub kind: AlertKind,
    /// The offending reading field, in the kind's unit
    pub value: f32,
    /// The limit it exceeded
    pub threshold: f32,
    /// Timestamp of the reading
    pub timestamp: Timestamp,
}

impl AlertEvent {
    /// How far above the limit the value was
    pub fn excess(&self) -> f32 {
        self.value - self.threshold
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} (limit {}) at t={}",
            self.kind,
            self.value,
            self.kind.unit(),
            self.threshold,
            self.timestamp
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AlertEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{}: {} (limit {}) at t={}",
            self.kind,
            self.value,
            self.threshold,
            self.timestamp
        )
    }
}
