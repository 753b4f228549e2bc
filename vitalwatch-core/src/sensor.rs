//! Sensor Reader
//!
//! Turns two single-channel ADC acquisitions into one `Reading`.
//!
//! ## Acquisition
//!
//! The board crate implements `AdcChannel` on top of its HAL. Like
//! embedded-hal's one-shot ADC, `read_channel` is non-blocking: it returns
//! `WouldBlock` while a conversion is in flight. The reader polls it until
//! the sample arrives or the read deadline passes.
//!
//! ```text
//! read_channel(0x01) ──► raw ──► scale ──► range check ──┐
//!                                                        ├──► Reading
//! read_channel(0x02) ──► raw ──► scale ──► range check ──┘
//! ```
//!
//! ## Failure Modes
//!
//! - HAL error → `SensorFault { reason: "acquisition failed" }`
//! - Raw sample above the converter's range → `SensorFault`
//! - Converted value NaN or outside the plausible range → `SensorFault`
//! - Conversion still busy at the deadline → `Timeout { SensorRead }`
//!
//! The reader holds only its fixed calibration. Every call produces an
//! independent sample.

use crate::config::{ChannelCalibration, MonitorConfig};
use crate::errors::{MonitorError, MonitorResult, Operation};
use crate::reading::Reading;
use crate::time::{poll_with_deadline, PollError, TimeSource};

/// ADC channel identifier as wired on the board
pub type ChannelId = u8;

/// Hardware acquisition collaborator
pub trait AdcChannel {
    /// Hardware-defined error
    type Error;

    /// Start or continue a conversion on `channel`
    ///
    /// Returns `WouldBlock` until the sample is ready.
    fn read_channel(&mut self, channel: ChannelId) -> nb::Result<u16, Self::Error>;
}

impl<A: AdcChannel + ?Sized> AdcChannel for &mut A {
    type Error = A::Error;

    fn read_channel(&mut self, channel: ChannelId) -> nb::Result<u16, Self::Error> {
        (**self).read_channel(channel)
    }
}

/// Reads the heart-rate and temperature pair
pub struct SensorReader<A> {
    adc: A,
    heart_rate: ChannelCalibration,
    temperature: ChannelCalibration,
    timeout_ms: u32,
}

impl<A: AdcChannel> SensorReader<A> {
    /// Create a reader with explicit calibrations
    pub fn new(
        adc: A,
        heart_rate: ChannelCalibration,
        temperature: ChannelCalibration,
        timeout_ms: u32,
    ) -> Self {
        Self { adc, heart_rate, temperature, timeout_ms }
    }

    /// Create a reader from the startup configuration
    pub fn from_config(adc: A, config: &MonitorConfig) -> Self {
        Self::new(adc, config.heart_rate, config.temperature, config.read_timeout_ms)
    }

    /// Sample both channels and stamp them with one timestamp
    pub fn read<C: TimeSource + ?Sized>(&mut self, clock: &C) -> MonitorResult<Reading> {
        let timestamp = clock.now();

        let heart_rate = self.acquire(clock, self.heart_rate)?;
        let temperature = self.acquire(clock, self.temperature)?;

        let bpm = libm::roundf(heart_rate);
        if !(0.0..=f32::from(u16::MAX)).contains(&bpm) {
            return Err(MonitorError::SensorFault {
                channel: self.heart_rate.channel,
                reason: "value outside plausible range",
            });
        }

        Ok(Reading::new(bpm as u16, temperature, timestamp))
    }

    /// Give the ADC back, e.g. to power it down
    pub fn release(self) -> A {
        self.adc
    }

    fn acquire<C: TimeSource + ?Sized>(
        &mut self,
        clock: &C,
        calibration: ChannelCalibration,
    ) -> MonitorResult<f32> {
        let channel = calibration.channel;
        let adc = &mut self.adc;

        let raw = poll_with_deadline(clock, self.timeout_ms, || adc.read_channel(channel))
            .map_err(|e| match e {
                PollError::TimedOut => MonitorError::Timeout { operation: Operation::SensorRead },
                PollError::Other(_) => MonitorError::SensorFault {
                    channel,
                    reason: "acquisition failed",
                },
            })?;

        let value = calibration.scale.convert(raw).ok_or(MonitorError::SensorFault {
            channel,
            reason: "raw sample above converter range",
        })?;

        if !value.is_finite() || value < calibration.min_value || value > calibration.max_value {
            return Err(MonitorError::SensorFault {
                channel,
                reason: "value outside plausible range",
            });
        }

        Ok(value)
    }
}
