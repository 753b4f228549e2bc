//! Alert Sink
//!
//! Receives the events raised by the evaluator and forwards each one to a
//! `Notifier` (buzzer, haptic motor, companion-app notification...).
//!
//! By default every event is forwarded, even when the same kind fired on
//! the previous cycle. `DedupPolicy::Cooldown` is an opt-in extension that
//! suppresses repeats of a kind inside a time window.
//!
//! The sink also keeps:
//! - the most recent event of each kind (`latest`)
//! - a bounded queue of forwarded events for a delivery task (`pop_pending`);
//!   when it is full the oldest event is dropped

use heapless::Deque;

use crate::constants::buffers::PENDING_ALERTS_CAPACITY;
use crate::reading::{AlertEvent, AlertKind};
use crate::time::Timestamp;

/// Downstream action for an alert
pub trait Notifier {
    /// Handle one alert
    fn notify(&mut self, event: &AlertEvent);
}

impl<F: FnMut(&AlertEvent)> Notifier for F {
    fn notify(&mut self, event: &AlertEvent) {
        self(event)
    }
}

/// Repeat suppression policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DedupPolicy {
    /// Forward every event
    #[default]
    Off,
    /// Drop an event if its kind was forwarded less than `window_ms` ago
    Cooldown {
        /// Suppression window in milliseconds
        window_ms: u32,
    },
}

/// Sink counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Events handed to `record`
    pub recorded: u32,
    /// Events forwarded to the notifier
    pub notified: u32,
    /// Events held back by the cooldown
    pub suppressed: u32,
    /// Pending events evicted because the queue was full
    pub dropped: u32,
}

/// Forwards alert events and keeps them available for delivery
pub struct AlertSink<N, const Q: usize = PENDING_ALERTS_CAPACITY> {
    notifier: N,
    policy: DedupPolicy,
    latest: [Option<AlertEvent>; AlertKind::COUNT],
    last_notified: [Option<Timestamp>; AlertKind::COUNT],
    pending: Deque<AlertEvent, Q>,
    stats: SinkStats,
}

impl<N: Notifier, const Q: usize> AlertSink<N, Q> {
    /// Sink that forwards every event
    pub fn new(notifier: N) -> Self {
        Self::with_policy(notifier, DedupPolicy::Off)
    }

    /// Sink with an explicit dedup policy
    pub fn with_policy(notifier: N, policy: DedupPolicy) -> Self {
        Self {
            notifier,
            policy,
            latest: [None; AlertKind::COUNT],
            last_notified: [None; AlertKind::COUNT],
            pending: Deque::new(),
            stats: SinkStats::default(),
        }
    }

    /// Forward a cycle's events
    pub fn record(&mut self, events: &[AlertEvent]) {
        for event in events {
            self.record_one(event);
        }
    }

    fn record_one(&mut self, event: &AlertEvent) {
        let slot = event.kind.index();
        self.stats.recorded += 1;
        self.latest[slot] = Some(*event);

        if self.in_cooldown(event) {
            self.stats.suppressed += 1;
            log_debug!("suppressed repeat {} alert", event.kind);
            return;
        }

        log_info!("alert: {}", event);
        self.notifier.notify(event);
        self.last_notified[slot] = Some(event.timestamp);
        self.stats.notified += 1;

        if self.pending.is_full() {
            self.pending.pop_front();
            self.stats.dropped += 1;
        }
        // Room was made above
        let _ = self.pending.push_back(*event);
    }

    fn in_cooldown(&self, event: &AlertEvent) -> bool {
        match self.policy {
            DedupPolicy::Off => false,
            DedupPolicy::Cooldown { window_ms } => self.last_notified[event.kind.index()]
                .map(|last| event.timestamp.saturating_sub(last) < u64::from(window_ms))
                .unwrap_or(false),
        }
    }

    /// Most recent event of `kind`, forwarded or not
    pub fn latest(&self, kind: AlertKind) -> Option<&AlertEvent> {
        self.latest[kind.index()].as_ref()
    }

    /// Take the oldest undelivered event
    pub fn pop_pending(&mut self) -> Option<AlertEvent> {
        self.pending.pop_front()
    }

    /// Number of undelivered events
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Active policy
    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Counters since construction
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Access the notifier
    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}
