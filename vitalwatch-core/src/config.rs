//! Startup Configuration
//!
//! Everything the pipeline needs is fixed once at startup and never mutated
//! afterwards: alert thresholds, cadence, hardware deadlines and the linear
//! conversion of each ADC channel. `MonitorConfig::default()` is the stock
//! device setup (100 bpm, 37.5 °C, 1 Hz, 10-bit ADC).
//!
//! Invalid values are rejected here, before the driver starts, which is the
//! only fatal error path in the crate.
//!
//! ```rust
//! use vitalwatch_core::{MonitorConfig, Thresholds};
//!
//! let config = MonitorConfig {
//!     thresholds: Thresholds::new(120, 38.0)?,
//!     cadence_ms: 500,
//!     ..MonitorConfig::default()
//! };
//! config.validate()?;
//! # Ok::<(), vitalwatch_core::ConfigError>(())
//! ```

use fugit::MillisDurationU32;

use crate::alerts::DedupPolicy;
use crate::constants::sensors::{
    ADC_10BIT_MAX_RAW, DEFAULT_HEART_RATE_LIMIT_BPM, DEFAULT_TEMPERATURE_LIMIT_C,
    HEART_RATE_CHANNEL, HEART_RATE_MAX_BPM, HEART_RATE_MIN_BPM, TEMPERATURE_CHANNEL,
    TEMP_FULL_SCALE_C, TEMP_RAW_DIVISOR, TEMP_SENSOR_MAX_C, TEMP_SENSOR_MIN_C,
};
use crate::constants::time::{
    DEFAULT_CADENCE_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_TRANSMIT_TIMEOUT_MS,
};
use crate::errors::ConfigError;

/// Alert limits, strict greater-than
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds {
    heart_rate_limit: u16,
    temperature_limit: f32,
}

impl Thresholds {
    /// Create limits for the default sensor ranges
    ///
    /// Use `within` when the channels are calibrated differently.
    pub fn new(heart_rate_limit: u16, temperature_limit: f32) -> Result<Self, ConfigError> {
        Self::within(
            heart_rate_limit,
            temperature_limit,
            &ChannelCalibration::heart_rate(),
            &ChannelCalibration::temperature(),
        )
    }

    /// Create limits that the given calibrations can actually exceed
    pub fn within(
        heart_rate_limit: u16,
        temperature_limit: f32,
        heart_rate: &ChannelCalibration,
        temperature: &ChannelCalibration,
    ) -> Result<Self, ConfigError> {
        let thresholds = Self { heart_rate_limit, temperature_limit };
        thresholds.validate(heart_rate, temperature)?;
        Ok(thresholds)
    }

    /// Heart rate limit in bpm
    pub const fn heart_rate_limit(&self) -> u16 {
        self.heart_rate_limit
    }

    /// Temperature limit in °C
    pub const fn temperature_limit(&self) -> f32 {
        self.temperature_limit
    }

    /// Check limits against the plausible range of each channel
    ///
    /// A limit at or above a channel's maximum can never be exceeded by a
    /// reading that passes the sensor range check. Needed again after
    /// deserialization, which bypasses the constructors.
    pub fn validate(
        &self,
        heart_rate: &ChannelCalibration,
        temperature: &ChannelCalibration,
    ) -> Result<(), ConfigError> {
        let bpm = f32::from(self.heart_rate_limit);
        if self.heart_rate_limit == 0 || bpm < heart_rate.min_value || bpm >= heart_rate.max_value {
            return Err(ConfigError::InvalidThreshold {
                field: "heart_rate_limit",
                reason: "must be positive and below the channel maximum",
            });
        }

        if !self.temperature_limit.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                field: "temperature_limit",
                reason: "not a finite number",
            });
        }

        if self.temperature_limit < temperature.min_value
            || self.temperature_limit >= temperature.max_value
        {
            return Err(ConfigError::InvalidThreshold {
                field: "temperature_limit",
                reason: "outside the sensor range",
            });
        }

        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            heart_rate_limit: DEFAULT_HEART_RATE_LIMIT_BPM,
            temperature_limit: DEFAULT_TEMPERATURE_LIMIT_C,
        }
    }
}

/// Linear conversion `raw / divisor * full_scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearScale {
    /// Largest raw sample the converter can legally produce
    pub raw_limit: u16,
    /// Raw value mapping to `full_scale`
    pub divisor: f32,
    /// Physical value at `raw == divisor`
    pub full_scale: f32,
    /// Added after scaling
    pub offset: f32,
}

impl LinearScale {
    /// Raw sample is already in physical units
    pub const fn identity(raw_limit: u16) -> Self {
        Self { raw_limit, divisor: 1.0, full_scale: 1.0, offset: 0.0 }
    }

    /// `raw / divisor * full_scale`
    pub const fn ratio(raw_limit: u16, divisor: f32, full_scale: f32) -> Self {
        Self { raw_limit, divisor, full_scale, offset: 0.0 }
    }

    /// Shift the scaled value by `offset`
    pub const fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Convert a raw sample, `None` when it exceeds `raw_limit`
    pub fn convert(&self, raw: u16) -> Option<f32> {
        if raw > self.raw_limit {
            return None;
        }
        Some(f32::from(raw) / self.divisor * self.full_scale + self.offset)
    }
}

/// How one ADC channel maps to a physical quantity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelCalibration {
    /// ADC channel id
    pub channel: u8,
    /// Raw to physical conversion
    pub scale: LinearScale,
    /// Lowest plausible physical value
    pub min_value: f32,
    /// Highest plausible physical value
    pub max_value: f32,
}

impl ChannelCalibration {
    /// Heart rate on channel 1, raw sample read as bpm
    pub const fn heart_rate() -> Self {
        Self {
            channel: HEART_RATE_CHANNEL,
            scale: LinearScale::identity(ADC_10BIT_MAX_RAW),
            min_value: HEART_RATE_MIN_BPM,
            max_value: HEART_RATE_MAX_BPM,
        }
    }

    /// Temperature on channel 2, `raw / 1024 * 100`
    pub const fn temperature() -> Self {
        Self {
            channel: TEMPERATURE_CHANNEL,
            scale: LinearScale::ratio(ADC_10BIT_MAX_RAW, TEMP_RAW_DIVISOR, TEMP_FULL_SCALE_C),
            min_value: TEMP_SENSOR_MIN_C,
            max_value: TEMP_SENSOR_MAX_C,
        }
    }

    /// Check the conversion can produce finite, ordered values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = &self.scale;
        if !(scale.divisor.is_finite() && scale.divisor > 0.0) {
            return Err(ConfigError::InvalidCalibration {
                channel: self.channel,
                reason: "divisor must be positive",
            });
        }

        if !(scale.full_scale.is_finite() && scale.offset.is_finite()) || scale.full_scale == 0.0 {
            return Err(ConfigError::InvalidCalibration {
                channel: self.channel,
                reason: "scale must be finite and non-zero",
            });
        }

        if !(self.min_value.is_finite() && self.max_value.is_finite()) || self.min_value >= self.max_value {
            return Err(ConfigError::InvalidCalibration {
                channel: self.channel,
                reason: "plausible range is empty",
            });
        }

        Ok(())
    }
}

/// Complete startup configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Alert limits
    pub thresholds: Thresholds,
    /// Interval between cycle starts (ms)
    pub cadence_ms: u32,
    /// Deadline for each ADC acquisition (ms)
    pub read_timeout_ms: u32,
    /// Deadline for handing one record to the transport (ms)
    pub transmit_timeout_ms: u32,
    /// Heart-rate channel conversion
    pub heart_rate: ChannelCalibration,
    /// Temperature channel conversion
    pub temperature: ChannelCalibration,
    /// Repeat suppression in the alert sink
    pub dedup: DedupPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            cadence_ms: DEFAULT_CADENCE_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            transmit_timeout_ms: DEFAULT_TRANSMIT_TIMEOUT_MS,
            heart_rate: ChannelCalibration::heart_rate(),
            temperature: ChannelCalibration::temperature(),
            dedup: DedupPolicy::Off,
        }
    }
}

impl MonitorConfig {
    /// Cadence as a typed duration
    pub fn cadence(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.cadence_ms)
    }

    /// Reject anything the driver cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cadence_ms == 0 {
            return Err(ConfigError::InvalidTiming {
                field: "cadence_ms",
                reason: "must be positive",
            });
        }

        // A single deadline longer than the cadence would let one stall eat
        // the whole next cycle.
        for (field, value) in [
            ("read_timeout_ms", self.read_timeout_ms),
            ("transmit_timeout_ms", self.transmit_timeout_ms),
        ] {
            if value == 0 || value > self.cadence_ms {
                return Err(ConfigError::InvalidTiming {
                    field,
                    reason: "must be positive and no longer than the cadence",
                });
            }
        }

        self.heart_rate.validate()?;
        self.temperature.validate()?;

        // Readings carry heart rate as whole bpm in a u16
        if self.heart_rate.min_value < 0.0 || self.heart_rate.max_value > f32::from(u16::MAX) {
            return Err(ConfigError::InvalidCalibration {
                channel: self.heart_rate.channel,
                reason: "heart rate range must fit 0..=65535 bpm",
            });
        }

        if self.heart_rate.channel == self.temperature.channel {
            return Err(ConfigError::InvalidCalibration {
                channel: self.temperature.channel,
                reason: "both sensors mapped to the same channel",
            });
        }

        self.thresholds.validate(&self.heart_rate, &self.temperature)
    }

    /// Parse a JSON document, filling missing fields from the defaults
    ///
    /// ```rust
    /// use vitalwatch_core::MonitorConfig;
    ///
    /// let config = MonitorConfig::from_json(r#"{
    ///     "thresholds": { "heart_rate_limit": 110, "temperature_limit": 38.0 },
    ///     "cadence_ms": 2000
    /// }"#)?;
    /// assert_eq!(config.thresholds.heart_rate_limit(), 110);
    /// assert_eq!(config.read_timeout_ms, 50);
    /// # Ok::<(), vitalwatch_core::ConfigError>(())
    /// ```
    #[cfg(feature = "std")]
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document).map_err(|e| ConfigError::Malformed {
            line: e.line(),
            column: e.column(),
        })?;
        config.validate()?;
        Ok(config)
    }
}
