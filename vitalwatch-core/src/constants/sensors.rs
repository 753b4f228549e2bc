//! Sensor Wiring and Physiological Limits
//!
//! Default wiring: heart rate on ADC channel 1 read
//! as raw bpm, skin temperature on channel 2 scaled as `raw / 1024 * 100`.

// ===== ADC WIRING =====

/// ADC channel wired to the heart-rate sensor.
pub const HEART_RATE_CHANNEL: u8 = 0x01;

/// ADC channel wired to the temperature sensor.
pub const TEMPERATURE_CHANNEL: u8 = 0x02;

/// Largest sample a 10-bit converter can produce.
pub const ADC_10BIT_MAX_RAW: u16 = 1023;

/// Divisor used by the reference temperature conversion.
///
/// Divides by 1024 rather than 1023, so a full-scale sample
/// lands just under 100 °C.
pub const TEMP_RAW_DIVISOR: f32 = 1024.0;

/// Full-scale value of the temperature channel (°C).
pub const TEMP_FULL_SCALE_C: f32 = 100.0;

// ===== HEART RATE =====

/// Lowest heart rate the sensor reports (bpm).
///
/// Zero is a valid "no pulse detected" sample, not a fault.
pub const HEART_RATE_MIN_BPM: f32 = 0.0;

/// Highest plausible heart rate (bpm).
///
/// Above any recorded human rate; larger values mean a wiring or ADC fault.
pub const HEART_RATE_MAX_BPM: f32 = 300.0;

/// Default alert limit for heart rate (bpm).
pub const DEFAULT_HEART_RATE_LIMIT_BPM: u16 = 100;

// ===== TEMPERATURE =====

/// Lowest temperature the channel can represent (°C).
pub const TEMP_SENSOR_MIN_C: f32 = 0.0;

/// Highest temperature the channel can represent (°C).
pub const TEMP_SENSOR_MAX_C: f32 = 100.0;

/// Default alert limit for body temperature (°C).
pub const DEFAULT_TEMPERATURE_LIMIT_C: f32 = 37.5;
