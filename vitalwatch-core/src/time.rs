//! Time management for the monitor
//!
//! Provides the monotonic clock abstraction used for reading timestamps,
//! hardware deadlines and cadence bookkeeping:
//! - Hardware tick counter (supplied by the board crate)
//! - `StdClock` on hosts
//! - `FixedTime` and `SteppingTime` for tests

use core::cell::Cell;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Source of monotonic time
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Monotonic host clock, zero at construction (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for StdClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock stuck at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Clock that advances by a fixed step every time it is read
///
/// Lets deadline loops terminate in tests without a real timer.
#[derive(Debug, Clone)]
pub struct SteppingTime {
    current: Cell<Timestamp>,
    step_ms: u64,
}

impl SteppingTime {
    /// Start at `start`, advancing `step_ms` per `now()` call
    pub fn new(start: Timestamp, step_ms: u64) -> Self {
        Self { current: Cell::new(start), step_ms }
    }

    /// Move forward by `ms` without counting as a read
    pub fn advance(&self, ms: u64) {
        self.current.set(self.current.get() + ms);
    }

    /// Current value without stepping
    pub fn peek(&self) -> Timestamp {
        self.current.get()
    }
}

impl TimeSource for SteppingTime {
    fn now(&self) -> Timestamp {
        let now = self.current.get();
        self.current.set(now + self.step_ms);
        now
    }
}

/// Why a deadline-bounded poll gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollError<E> {
    /// Still `WouldBlock` when the deadline passed
    TimedOut,
    /// The operation itself failed
    Other(E),
}

/// Drive a non-blocking operation until it completes or `timeout_ms` elapses
///
/// Like `nb::block!`, but with a deadline on the monotonic clock. The
/// operation is always attempted at least once, even with a zero timeout.
pub fn poll_with_deadline<T, E, C, F>(clock: &C, timeout_ms: u32, mut op: F) -> Result<T, PollError<E>>
where
    C: TimeSource + ?Sized,
    F: FnMut() -> nb::Result<T, E>,
{
    let start = clock.now();
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(nb::Error::Other(e)) => return Err(PollError::Other(e)),
            Err(nb::Error::WouldBlock) => {
                if clock.now().saturating_sub(start) >= u64::from(timeout_ms) {
                    return Err(PollError::TimedOut);
                }
            }
        }
    }
}
