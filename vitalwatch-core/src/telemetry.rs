//! Telemetry Formatter and Transmitter
//!
//! Each cycle's reading goes out over the wireless link as one short text
//! record:
//!
//! ```text
//! HR: 101 bpm, Temp: 36.00 °C
//! ```
//!
//! ## Bounded Formatting
//!
//! The record is written into a fixed 50-byte `heapless::String`. If the
//! text does not fit, formatting fails with `FormatOverflow` instead of
//! truncating mid-field. The widest record for values the sensor reader
//! accepts (`HR: 65535 bpm, Temp: -100.00 °C`) is 32 bytes, so overflow
//! only happens for readings built outside the reader.
//!
//! ## Transmission
//!
//! `Transport` is the link-layer collaborator. It is non-blocking like the
//! ADC: `WouldBlock` while the radio is busy. `Transmitter` polls it until
//! the record is accepted or the transmit deadline passes. Delivery is
//! best effort, at most once per cycle: a failed record is not retried.

use core::fmt::Write;

use heapless::String;

use crate::constants::buffers::TELEMETRY_MAX_LEN;
use crate::errors::{MonitorError, MonitorResult, Operation};
use crate::reading::Reading;
use crate::time::{poll_with_deadline, PollError, TimeSource};

/// Bounded telemetry record
pub type TelemetryPayload = String<TELEMETRY_MAX_LEN>;

const HR_PREFIX: &str = "HR: ";
const TEMP_SEPARATOR: &str = " bpm, Temp: ";
const TEMP_SUFFIX: &str = " °C";

/// Render a reading as a telemetry record
pub fn format(reading: &Reading) -> MonitorResult<TelemetryPayload> {
    let mut payload = TelemetryPayload::new();
    write!(
        payload,
        "{}{}{}{:.2}{}",
        HR_PREFIX,
        reading.heart_rate(),
        TEMP_SEPARATOR,
        reading.temperature(),
        TEMP_SUFFIX
    )
    .map_err(|_| MonitorError::FormatOverflow { capacity: TELEMETRY_MAX_LEN })?;
    Ok(payload)
}

/// Values recovered from a telemetry record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Heart rate in bpm
    pub heart_rate: u16,
    /// Temperature in °C, rounded to two decimals
    pub temperature: f32,
}

/// Parse a record produced by `format`
///
/// Returns `None` for anything that is not exactly in that layout.
pub fn parse(payload: &str) -> Option<TelemetrySample> {
    let rest = payload.strip_prefix(HR_PREFIX)?;
    let (heart_rate, rest) = rest.split_once(TEMP_SEPARATOR)?;
    let temperature = rest.strip_suffix(TEMP_SUFFIX)?;

    Some(TelemetrySample {
        heart_rate: heart_rate.parse().ok()?,
        temperature: temperature.parse().ok()?,
    })
}

/// Wireless link collaborator
pub trait Transport {
    /// Link-defined error
    type Error;

    /// Queue `payload` for sending
    ///
    /// Returns `WouldBlock` while the link is busy. Callers retry with the
    /// same payload until it returns `Ok` or an error.
    fn send(&mut self, payload: &[u8]) -> nb::Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, payload: &[u8]) -> nb::Result<(), Self::Error> {
        (**self).send(payload)
    }
}

/// Hands telemetry records to the transport under a deadline
pub struct Transmitter<T> {
    transport: T,
    timeout_ms: u32,
}

impl<T: Transport> Transmitter<T> {
    /// Wrap a transport
    pub fn new(transport: T, timeout_ms: u32) -> Self {
        Self { transport, timeout_ms }
    }

    /// Send one record
    pub fn transmit<C: TimeSource + ?Sized>(
        &mut self,
        payload: &TelemetryPayload,
        clock: &C,
    ) -> MonitorResult<()> {
        let transport = &mut self.transport;
        let bytes = payload.as_bytes();

        poll_with_deadline(clock, self.timeout_ms, || transport.send(bytes)).map_err(|e| match e {
            PollError::TimedOut => MonitorError::Timeout { operation: Operation::Transmit },
            PollError::Other(_) => MonitorError::TransmitError { reason: "link rejected payload" },
        })
    }

    /// Access the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back
    pub fn release(self) -> T {
        self.transport
    }
}
