//! Wireless Link Transports
//!
//! ## Overview
//!
//! Implementations of `vitalwatch_core::Transport` for host builds and
//! gateways. Each one is non-blocking: it returns `WouldBlock` while the link
//! is busy and lets the core's deadline decide when to give up.
//!
//! ### Serial (BLE UART)
//!
//! **When to use:**
//! - BLE modules exposing a UART service (Nordic UART, HM-10)
//! - USB CDC links to a companion device
//! - Piping telemetry to a file or stdout during bring-up
//!
//! Frames are the telemetry text followed by `\n`. Works over anything that
//! implements `std::io::Write`, blocking or not.
//!
//! ### MQTT (feature `mqtt`)
//!
//! **When to use:**
//! - The wearable pairs with a gateway that has Wi-Fi or Ethernet
//! - Several consumers (dashboard, clinician app) need the same stream
//!
//! Records are published with QoS 0, matching the at-most-once contract of
//! the telemetry path: a lost record is superseded by the next cycle.
//!
//! ## Example Usage
//!
//! ```rust
//! use vitalwatch_connectors::SerialTransport;
//! use vitalwatch_core::Transport;
//!
//! let mut link = SerialTransport::new(Vec::new());
//! link.send(b"HR: 72 bpm, Temp: 36.60 \xC2\xB0C").unwrap();
//! assert_eq!(link.stats().messages_sent, 1);
//! ```

pub mod serial;

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Re-export common types
pub use serial::SerialTransport;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConfig, MqttTransport};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The peer or device stopped accepting bytes
    #[error("Link closed by peer")]
    Closed,

    /// Record plus framing does not fit the frame buffer
    #[error("Frame of {len} bytes exceeds {capacity}")]
    FrameTooLarge {
        /// Framed length in bytes
        len: usize,
        /// Frame buffer capacity in bytes
        capacity: usize,
    },

    /// Writer failed with something other than `WouldBlock`
    #[error("I/O error: {0}")]
    Io(std::io::ErrorKind),

    /// Broker client refused the request
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
}
