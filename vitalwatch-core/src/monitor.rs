//! Polling Loop Driver
//!
//! ## Overview
//!
//! Runs the pipeline once per cadence period:
//!
//! ```text
//!  ┌────────── cycle ───────────────────────────────────────────┐
//!  │ read ──► evaluate ──► record alerts                        │
//!  │   └────► format ───► transmit                              │
//!  └──► sleep until next boundary ──► check stop signal ──► ... ┘
//! ```
//!
//! ## States
//!
//! - `Idle`: constructed, no cycle run yet (or `run` has returned)
//! - `Running`: cycles in progress
//!
//! There is no terminal state on the device: the loop runs until power is
//! lost. On hosts and in tests `run` takes a cycle limit and a `StopSignal`
//! that is checked once per cycle boundary.
//!
//! ## Error Policy
//!
//! Every cycle error is caught here, logged, counted and reported in the
//! `CycleReport`. The loop always moves on to the next cycle. The only fatal
//! error is an invalid `MonitorConfig`, rejected by `Monitor::new`.
//!
//! ## Timing
//!
//! Cycles start on a fixed cadence. The sleep after a cycle is the cadence
//! minus the time the cycle took; an overrunning cycle is followed directly
//! by the next one.

use core::sync::atomic::{AtomicBool, Ordering};

use fugit::MillisDurationU32;

use crate::alerts::{AlertSink, Notifier};
use crate::config::MonitorConfig;
use crate::errors::{ConfigError, MonitorError};
use crate::evaluator::{evaluate, Alerts};
use crate::reading::Reading;
use crate::sensor::{AdcChannel, SensorReader};
use crate::telemetry::{self, Transmitter, Transport};
use crate::time::{TimeSource, Timestamp};

/// Blocking delay between cycles
pub trait Delay {
    /// Suspend for `duration`
    fn delay(&mut self, duration: MillisDurationU32);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay(&mut self, duration: MillisDurationU32) {
        (**self).delay(duration)
    }
}

/// Thread sleep (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

#[cfg(feature = "std")]
impl Delay for ThreadDelay {
    fn delay(&mut self, duration: MillisDurationU32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(duration.ticks())));
    }
}

/// Cooperative stop request, checked once per cycle boundary
///
/// Safe to share with an interrupt handler or another thread.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: AtomicBool,
}

impl StopSignal {
    /// Signal in the "keep running" state
    pub const fn new() -> Self {
        Self { stopped: AtomicBool::new(false) }
    }

    /// Ask the loop to stop at the next boundary
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Check whether a stop was requested
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Clear a previous request so the loop can be restarted
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::Release);
    }
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No cycle in progress
    Idle,
    /// Cycles in progress
    Running,
}

/// What happened during one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle number, starting at 1
    pub cycle: u32,
    /// The reading, if acquisition succeeded
    pub reading: Option<Reading>,
    /// Alerts raised by the reading
    pub alerts: Alerts,
    /// Telemetry was accepted by the transport
    pub transmitted: bool,
    /// The error that cut the cycle short, if any
    pub error: Option<MonitorError>,
}

/// Cumulative counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Cycles started
    pub cycles: u32,
    /// Readings acquired
    pub readings: u32,
    /// Alerts raised by the evaluator
    pub alerts: u32,
    /// Records accepted by the transport
    pub transmitted: u32,
    /// `SensorFault` errors
    pub sensor_faults: u32,
    /// `FormatOverflow` errors
    pub format_overflows: u32,
    /// `TransmitError` errors
    pub transmit_errors: u32,
    /// `Timeout` errors, either operation
    pub timeouts: u32,
    /// Cycles that took longer than the cadence
    pub overruns: u32,
}

impl MonitorStats {
    fn count_error(&mut self, error: &MonitorError) {
        match error {
            MonitorError::SensorFault { .. } => self.sensor_faults += 1,
            MonitorError::FormatOverflow { .. } => self.format_overflows += 1,
            MonitorError::TransmitError { .. } => self.transmit_errors += 1,
            MonitorError::Timeout { .. } => self.timeouts += 1,
        }
    }

    /// Errors of any kind
    pub fn errors(&self) -> u32 {
        self.sensor_faults + self.format_overflows + self.transmit_errors + self.timeouts
    }
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop signal was raised
    Signalled,
    /// The cycle limit was reached
    CycleLimit,
}

/// Result of a `run` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles completed during this call
    pub cycles: u32,
    /// Cycles of this call that reported an error
    pub failed_cycles: u32,
    /// Why the loop ended
    pub reason: StopReason,
}

/// The polling loop driver
pub struct Monitor<A, T, N, C, D> {
    config: MonitorConfig,
    reader: SensorReader<A>,
    transmitter: Transmitter<T>,
    sink: AlertSink<N>,
    clock: C,
    delay: D,
    state: MonitorState,
    stats: MonitorStats,
}

impl<A, T, N, C, D> Monitor<A, T, N, C, D>
where
    A: AdcChannel,
    T: Transport,
    N: Notifier,
    C: TimeSource,
    D: Delay,
{
    /// Validate the configuration and wire the collaborators together
    pub fn new(
        config: MonitorConfig,
        adc: A,
        transport: T,
        notifier: N,
        clock: C,
        delay: D,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        log_debug!(
            "monitor v{} configured: cadence {} ms, limits {} bpm / {} C",
            crate::VERSION,
            config.cadence_ms,
            config.thresholds.heart_rate_limit(),
            config.thresholds.temperature_limit()
        );

        Ok(Self {
            reader: SensorReader::from_config(adc, &config),
            transmitter: Transmitter::new(transport, config.transmit_timeout_ms),
            sink: AlertSink::with_policy(notifier, config.dedup),
            config,
            clock,
            delay,
            state: MonitorState::Idle,
            stats: MonitorStats::default(),
        })
    }

    /// Run one cycle without sleeping
    pub fn run_cycle(&mut self) -> CycleReport {
        self.state = MonitorState::Running;
        self.stats.cycles += 1;

        let mut report = CycleReport {
            cycle: self.stats.cycles,
            reading: None,
            alerts: Alerts::new(),
            transmitted: false,
            error: None,
        };

        if let Err(error) = self.process(&mut report) {
            self.stats.count_error(&error);
            log_warn!("cycle {}: {}", report.cycle, error);
            report.error = Some(error);
        }

        report
    }

    fn process(&mut self, report: &mut CycleReport) -> Result<(), MonitorError> {
        let reading = self.reader.read(&self.clock)?;
        self.stats.readings += 1;
        report.reading = Some(reading);

        report.alerts = evaluate(&reading, &self.config.thresholds);
        self.stats.alerts += report.alerts.len() as u32;
        self.sink.record(&report.alerts);

        let payload = telemetry::format(&reading)?;
        self.transmitter.transmit(&payload, &self.clock)?;
        self.stats.transmitted += 1;
        report.transmitted = true;

        Ok(())
    }

    /// Run cycles until `stop` is raised or `max_cycles` have run
    ///
    /// `None` runs until stopped. The driver is `Idle` again on return.
    pub fn run(&mut self, stop: &StopSignal, max_cycles: Option<u32>) -> RunSummary {
        let mut cycles = 0;
        let mut failed_cycles = 0;

        let reason = loop {
            if stop.is_stopped() {
                break StopReason::Signalled;
            }
            if max_cycles.is_some_and(|limit| cycles >= limit) {
                break StopReason::CycleLimit;
            }

            let started = self.clock.now();
            let report = self.run_cycle();
            cycles += 1;
            if report.error.is_some() {
                failed_cycles += 1;
            }

            // No point sleeping after the last permitted cycle
            if max_cycles.is_some_and(|limit| cycles >= limit) {
                continue;
            }
            self.sleep_until_next_boundary(started);
        };

        self.state = MonitorState::Idle;
        log_debug!("monitor stopped after {} cycles", cycles);

        RunSummary { cycles, failed_cycles, reason }
    }

    fn sleep_until_next_boundary(&mut self, started: Timestamp) {
        let elapsed = self.clock.now().saturating_sub(started);
        let cadence = u64::from(self.config.cadence_ms);

        if elapsed >= cadence {
            self.stats.overruns += 1;
            log_debug!("cycle overran cadence by {} ms", elapsed - cadence);
            return;
        }

        // Fits in u32 because it is below the cadence
        let remaining = (cadence - elapsed) as u32;
        self.delay.delay(MillisDurationU32::from_ticks(remaining));
    }

    /// Current state
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Counters since construction
    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The alert sink, for delivery tasks
    pub fn sink(&self) -> &AlertSink<N> {
        &self.sink
    }

    /// The alert sink, mutable, for draining pending events
    pub fn sink_mut(&mut self) -> &mut AlertSink<N> {
        &mut self.sink
    }

    /// Tear down and return the ADC and transport
    pub fn release(self) -> (A, T) {
        (self.reader.release(), self.transmitter.release())
    }
}
