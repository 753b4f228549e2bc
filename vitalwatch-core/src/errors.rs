//! Error Types for the Monitoring Pipeline
//!
//! ## Design
//!
//! Errors are returned from the per-cycle hot path, so they follow the same
//! rules as the rest of the core:
//!
//! 1. **No Heap Allocation**: messages are `&'static str`, never `String`.
//! 2. **Copy Semantics**: cheap to return, store in a report or count.
//! 3. **Actionable**: each variant says which stage failed.
//!
//! ## Error Categories
//!
//! ### Cycle errors (`MonitorError`)
//! - `SensorFault`: acquisition failed or the sample is out of range
//! - `FormatOverflow`: telemetry record did not fit its buffer
//! - `TransmitError`: the link refused the record
//! - `Timeout`: a bounded hardware operation missed its deadline
//!
//! None of these are fatal. The driver catches them at the cycle boundary,
//! logs them and moves on to the next cycle.
//!
//! ### Startup errors (`ConfigError`)
//! Invalid thresholds, cadence, deadlines or calibration. The driver refuses
//! to start with them.
//!
//! ```rust
//! use vitalwatch_core::{MonitorError, Operation};
//!
//! fn describe(err: MonitorError) -> &'static str {
//!     match err {
//!         MonitorError::SensorFault { .. } => "check electrode contact",
//!         MonitorError::Timeout { operation: Operation::SensorRead } => "ADC stalled",
//!         MonitorError::Timeout { operation: Operation::Transmit } => "link congested",
//!         MonitorError::TransmitError { .. } => "link down",
//!         MonitorError::FormatOverflow { .. } => "payload too large",
//!     }
//! }
//! ```

use core::fmt;
use thiserror_no_std::Error;

/// Result type for per-cycle operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Bounded operation that can miss its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// ADC acquisition
    SensorRead,
    /// Handing telemetry to the transport
    Transmit,
}

impl Operation {
    /// Short name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::SensorRead => "sensor read",
            Operation::Transmit => "transmit",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised during a polling cycle
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// Hardware read failed or produced an out-of-range sample
    #[error("Sensor fault on channel {channel}: {reason}")]
    SensorFault {
        /// ADC channel that failed
        channel: u8,
        /// What went wrong
        reason: &'static str,
    },

    /// Telemetry payload did not fit the output buffer
    #[error("Telemetry payload exceeds {capacity} bytes")]
    FormatOverflow {
        /// Buffer capacity in bytes
        capacity: usize,
    },

    /// Link layer refused the payload
    #[error("Transmit failed: {reason}")]
    TransmitError {
        /// What went wrong
        reason: &'static str,
    },

    /// A bounded operation exceeded its deadline
    #[error("{operation} timed out")]
    Timeout {
        /// Which operation stalled
        operation: Operation,
    },
}

impl MonitorError {
    /// Check if this error came from the sensor side of the cycle
    pub fn is_sensor_side(&self) -> bool {
        matches!(
            self,
            MonitorError::SensorFault { .. }
                | MonitorError::Timeout { operation: Operation::SensorRead }
        )
    }
}

/// Startup configuration errors
///
/// These abort before the driver enters `Running`.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Alert threshold outside the range the sensors can report
    #[error("Invalid threshold {field}: {reason}")]
    InvalidThreshold {
        /// Threshold field name
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Cadence or deadline unusable
    #[error("Invalid timing {field}: {reason}")]
    InvalidTiming {
        /// Timing field name
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Channel conversion cannot produce meaningful values
    #[error("Invalid calibration for channel {channel}: {reason}")]
    InvalidCalibration {
        /// ADC channel
        channel: u8,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Configuration document could not be parsed
    #[error("Malformed configuration at line {line}, column {column}")]
    Malformed {
        /// 1-based line of the syntax or type error
        line: usize,
        /// 1-based column of the syntax or type error
        column: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for Operation {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MonitorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorFault { channel, reason } =>
                defmt::write!(fmt, "Sensor fault on channel {}: {}", channel, reason),
            Self::FormatOverflow { capacity } =>
                defmt::write!(fmt, "Payload exceeds {} bytes", capacity),
            Self::TransmitError { reason } =>
                defmt::write!(fmt, "Transmit failed: {}", reason),
            Self::Timeout { operation } =>
                defmt::write!(fmt, "{} timed out", operation),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidThreshold { field, reason } =>
                defmt::write!(fmt, "Invalid threshold {}: {}", field, reason),
            Self::InvalidTiming { field, reason } =>
                defmt::write!(fmt, "Invalid timing {}: {}", field, reason),
            Self::InvalidCalibration { channel, reason } =>
                defmt::write!(fmt, "Invalid calibration ch{}: {}", channel, reason),
            Self::Malformed { line, column } =>
                defmt::write!(fmt, "Malformed config at {}:{}", line, column),
        }
    }
}
