//! Sensor-to-alert pipeline for wearable health monitors
//!
//! Samples a heart-rate channel and a temperature channel once per cycle,
//! checks them against configured thresholds, forwards alerts and sends a
//! short telemetry record over the wireless link.
//!
//! Key constraints:
//! - Runs on small MCUs (no heap, bounded `heapless` containers only)
//! - Hardware access through `nb` non-blocking traits with deadlines
//! - A failed read or transmit never stops monitoring
//!
//! ```no_run
//! use vitalwatch_core::{evaluate, telemetry, Reading, Thresholds};
//!
//! let thresholds = Thresholds::new(100, 37.5).unwrap();
//! let reading = Reading::new(101, 36.0, 1_000);
//!
//! for alert in evaluate(&reading, &thresholds) {
//!     // forward to the notifier
//!     let _ = alert;
//! }
//!
//! let payload = telemetry::format(&reading).unwrap();
//! assert_eq!(payload.as_str(), "HR: 101 bpm, Temp: 36.00 °C");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod alerts;
pub mod config;
pub mod constants;
pub mod errors;
pub mod evaluator;
pub mod monitor;
pub mod reading;
pub mod sensor;
pub mod telemetry;
pub mod time;

// Public API
pub use alerts::{AlertSink, DedupPolicy, Notifier};
pub use config::{ChannelCalibration, LinearScale, MonitorConfig, Thresholds};
pub use errors::{ConfigError, MonitorError, MonitorResult, Operation};
pub use evaluator::{evaluate, Alerts};
pub use monitor::{
    CycleReport, Delay, Monitor, MonitorState, MonitorStats, RunSummary, StopReason, StopSignal,
};
pub use reading::{AlertEvent, AlertKind, Reading};
pub use sensor::{AdcChannel, ChannelId, SensorReader};
pub use telemetry::{TelemetryPayload, TelemetrySample, Transmitter, Transport};
pub use time::{TimeSource, Timestamp};

#[cfg(feature = "std")]
pub use monitor::ThreadDelay;
#[cfg(feature = "std")]
pub use time::StdClock;

/// Crate version, reported in the startup log line
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
