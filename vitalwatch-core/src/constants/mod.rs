//! Constants for VitalWatch Core
//!
//! Numeric values used across the pipeline, grouped by domain. Units are
//! part of every name.
//!
//! - **Sensors**: ADC wiring, conversion defaults and plausible physiological ranges
//! - **Time**: cadence and deadline defaults
//! - **Buffers**: bounded container capacities

/// Sensor wiring, conversion defaults and plausible physiological ranges.
pub mod sensors;

/// Cadence and deadline defaults.
pub mod time;

/// Capacities of the bounded containers used in the hot path.
pub mod buffers;

pub use sensors::{
    DEFAULT_HEART_RATE_LIMIT_BPM, DEFAULT_TEMPERATURE_LIMIT_C,
    HEART_RATE_CHANNEL, TEMPERATURE_CHANNEL,
};

pub use time::{
    DEFAULT_CADENCE_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_TRANSMIT_TIMEOUT_MS,
};

pub use buffers::{PENDING_ALERTS_CAPACITY, TELEMETRY_MAX_LEN};
