//! Newline-framed serial transport
//!
//! Writes each telemetry record followed by `\n` to any `std::io::Write`.
//! Non-blocking writers are supported: a partially written frame is kept and
//! completed on the next `send` call, so the receiver never sees a torn line.
//!
//! If the core gives up on a frame (deadline) and the next cycle sends a new
//! record, the stale frame is finished first and the new one follows it. A
//! stale frame that fails is dropped and counted; the new record is still
//! attempted.

use std::io::{ErrorKind, Write};

use heapless::Vec;
use log::{debug, warn};
use vitalwatch_core::{constants::TELEMETRY_MAX_LEN, Transport};

use crate::{ConnectionStats, ConnectorError};

/// Payload plus the trailing newline
pub const FRAME_CAPACITY: usize = TELEMETRY_MAX_LEN + 1;

const FRAME_END: u8 = b'\n';

/// Serial link over a byte writer
pub struct SerialTransport<W> {
    writer: W,
    frame: Vec<u8, FRAME_CAPACITY>,
    written: usize,
    stats: ConnectionStats,
}

impl<W: Write> SerialTransport<W> {
    /// Wrap a writer (UART, BLE UART socket, stdout...)
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frame: Vec::new(),
            written: 0,
            stats: ConnectionStats::default(),
        }
    }

    /// Connection statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Whether a frame is staged but not fully written
    pub fn has_pending_frame(&self) -> bool {
        !self.frame.is_empty()
    }

    /// Access the writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Give the writer back
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn stage(&mut self, payload: &[u8]) -> Result<(), ConnectorError> {
        let staged = self
            .frame
            .extend_from_slice(payload)
            .and_then(|()| self.frame.push(FRAME_END).map_err(|_| ()));

        if staged.is_err() {
            self.frame.clear();
            return Err(ConnectorError::FrameTooLarge {
                len: payload.len() + 1,
                capacity: FRAME_CAPACITY,
            });
        }
        self.written = 0;
        Ok(())
    }

    fn staged_payload(&self) -> &[u8] {
        self.frame.split_last().map(|(_, payload)| payload).unwrap_or(&[])
    }

    fn fail(&mut self, error: ConnectorError) -> nb::Error<ConnectorError> {
        warn!("serial link dropped frame: {}", error);
        self.frame.clear();
        self.written = 0;
        self.stats.messages_failed += 1;
        nb::Error::Other(error)
    }

    /// Push the staged frame out; `Ok` once the writer has all of it
    fn drain(&mut self) -> nb::Result<(), ConnectorError> {
        while self.written < self.frame.len() {
            match self.writer.write(&self.frame[self.written..]) {
                Ok(0) => return Err(self.fail(ConnectorError::Closed)),
                Ok(n) => self.written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Err(nb::Error::WouldBlock),
                Err(e) => return Err(self.fail(ConnectorError::Io(e.kind()))),
            }
        }

        match self.writer.flush() {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Err(nb::Error::WouldBlock),
            Err(e) => return Err(self.fail(ConnectorError::Io(e.kind()))),
        }

        self.stats.messages_sent += 1;
        self.stats.bytes_sent += self.frame.len() as u64;
        self.frame.clear();
        self.written = 0;
        Ok(())
    }
}

impl<W: Write> Transport for SerialTransport<W> {
    type Error = ConnectorError;

    fn send(&mut self, payload: &[u8]) -> nb::Result<(), ConnectorError> {
        if self.has_pending_frame() && self.staged_payload() != payload {
            debug!("finishing stale frame before new record");
            match self.drain() {
                Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
                // A failed stale frame is already cleared and counted by `fail`
                Ok(()) | Err(nb::Error::Other(_)) => {}
            }
        }

        if !self.has_pending_frame() {
            if let Err(e) = self.stage(payload) {
                return Err(self.fail(e));
            }
        }

        self.drain()
    }
}
