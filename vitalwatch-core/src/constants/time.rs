//! Time-Related Constants

/// Default interval between polling cycles (milliseconds).
///
/// 1 Hz.
pub const DEFAULT_CADENCE_MS: u32 = 1000;

/// Default deadline for a single ADC acquisition (milliseconds).
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 50;

/// Default deadline for handing one telemetry record to the link (milliseconds).
///
/// BLE connection intervals run up to a few hundred milliseconds.
pub const DEFAULT_TRANSMIT_TIMEOUT_MS: u32 = 250;
