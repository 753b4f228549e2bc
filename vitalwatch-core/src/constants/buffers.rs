//! Buffer Sizes

/// Maximum telemetry payload length in bytes.
///
/// Size of the record buffer on deployed devices.
pub const TELEMETRY_MAX_LEN: usize = 50;

/// Alert events held for a delivery task before the oldest is dropped.
pub const PENDING_ALERTS_CAPACITY: usize = 8;

/// Alert kinds a single reading can raise.
pub const MAX_ALERTS_PER_READING: usize = 2;
