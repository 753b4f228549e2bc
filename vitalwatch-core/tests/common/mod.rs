//! Shared test doubles for integration tests
//!
//! Provides:
//! - `SimClock` / `SimDelay`: simulated monotonic time, advanced by sleeps
//!   and by hardware polls
//! - `ScriptedAdc`: replays a per-cycle script of samples, stalls and faults
//! - `RecordingLink`: transport with scripted outcomes that keeps what it sent
//! - `alert_log`: notifier closure collecting alerts

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use fugit::MillisDurationU32;
use vitalwatch_core::{
    constants::{HEART_RATE_CHANNEL, TEMPERATURE_CHANNEL},
    AdcChannel, AlertEvent, ChannelId, Delay, LinearScale, MonitorConfig, TimeSource, Timestamp,
    Transport,
};

/// Simulated time shared between collaborators
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<Timestamp>>);

impl SimClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl TimeSource for SimClock {
    fn now(&self) -> Timestamp {
        self.0.get()
    }
}

/// Delay that moves the simulated clock and records each sleep
pub struct SimDelay {
    clock: SimClock,
    pub slept: Rc<RefCell<Vec<u32>>>,
}

impl SimDelay {
    pub fn new(clock: &SimClock) -> Self {
        Self { clock: clock.clone(), slept: Rc::default() }
    }
}

impl Delay for SimDelay {
    fn delay(&mut self, duration: MillisDurationU32) {
        self.slept.borrow_mut().push(duration.ticks());
        self.clock.advance(u64::from(duration.ticks()));
    }
}

/// One cycle's worth of ADC behaviour
#[derive(Debug, Clone, Copy)]
pub enum Sample {
    /// Raw heart-rate and temperature samples
    Pair(u16, u16),
    /// Conversion stays busy for `ms` of simulated time
    Stall { ms: u64 },
    /// Heart-rate acquisition reports a hardware error
    Fault,
}

/// Replays `Sample`s, one per cycle; the last pair repeats once the script runs out
pub struct ScriptedAdc {
    script: VecDeque<Sample>,
    clock: SimClock,
    poll_cost_ms: u64,
    current: Option<(u16, u16)>,
    stall_started: Option<Timestamp>,
}

impl ScriptedAdc {
    pub fn new(clock: &SimClock, script: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            script: script.into_iter().collect(),
            clock: clock.clone(),
            poll_cost_ms: 1,
            current: None,
            stall_started: None,
        }
    }

    /// Simulated time each poll takes
    pub fn with_poll_cost(mut self, ms: u64) -> Self {
        self.poll_cost_ms = ms;
        self
    }

    fn next_heart_rate(&mut self) -> nb::Result<u16, ()> {
        let now = self.clock.now();

        if let Some(Sample::Stall { ms }) = self.script.front().copied() {
            let started = *self.stall_started.get_or_insert(now);
            if now - started < ms {
                return Err(nb::Error::WouldBlock);
            }
            self.script.pop_front();
            self.stall_started = None;
        }

        match self.script.pop_front() {
            Some(Sample::Pair(hr, temp)) => {
                self.current = Some((hr, temp));
                Ok(hr)
            }
            Some(Sample::Fault) => Err(nb::Error::Other(())),
            Some(stall @ Sample::Stall { .. }) => {
                self.script.push_front(stall);
                Err(nb::Error::WouldBlock)
            }
            None => self.current.map(|(hr, _)| hr).ok_or(nb::Error::Other(())),
        }
    }
}

impl AdcChannel for ScriptedAdc {
    type Error = ();

    fn read_channel(&mut self, channel: ChannelId) -> nb::Result<u16, ()> {
        self.clock.advance(self.poll_cost_ms);
        match channel {
            HEART_RATE_CHANNEL => self.next_heart_rate(),
            TEMPERATURE_CHANNEL => self.current.map(|(_, temp)| temp).ok_or(nb::Error::Other(())),
            _ => Err(nb::Error::Other(())),
        }
    }
}

/// Transport with scripted outcomes; succeeds once the script runs out
#[derive(Default)]
pub struct RecordingLink {
    outcomes: VecDeque<Result<(), ()>>,
    pub sent: Rc<RefCell<Vec<String>>>,
}

impl RecordingLink {
    pub fn new(outcomes: impl IntoIterator<Item = Result<(), ()>>) -> Self {
        Self { outcomes: outcomes.into_iter().collect(), sent: Rc::default() }
    }
}

impl Transport for RecordingLink {
    type Error = ();

    fn send(&mut self, payload: &[u8]) -> nb::Result<(), ()> {
        self.outcomes.pop_front().unwrap_or(Ok(())).map_err(nb::Error::Other)?;
        self.sent.borrow_mut().push(String::from_utf8_lossy(payload).into_owned());
        Ok(())
    }
}

/// Notifier collecting alerts into a shared log
pub fn alert_log() -> (Rc<RefCell<Vec<AlertEvent>>>, impl FnMut(&AlertEvent)) {
    let log: Rc<RefCell<Vec<AlertEvent>>> = Rc::default();
    let sink = log.clone();
    (log, move |event: &AlertEvent| sink.borrow_mut().push(*event))
}

/// Default config with temperature read as `raw / 10` °C, so scenarios use whole raw numbers
pub fn decicelsius_config() -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.temperature.scale = LinearScale::ratio(1023, 10.0, 1.0);
    config
}
