//! Threshold Evaluator
//!
//! Pure mapping from a reading to the alerts it raises. Both checks are
//! independent and use strict greater-than, so a value equal to its limit
//! never alerts. There is no failure path.

use heapless::Vec;

use crate::config::Thresholds;
use crate::constants::buffers::MAX_ALERTS_PER_READING;
use crate::reading::{AlertEvent, AlertKind, Reading};

/// Alerts raised by one reading, heart rate first
pub type Alerts = Vec<AlertEvent, MAX_ALERTS_PER_READING>;

/// Check a reading against the configured limits
pub fn evaluate(reading: &Reading, thresholds: &Thresholds) -> Alerts {
    let mut alerts = Alerts::new();

    if reading.heart_rate() > thresholds.heart_rate_limit() {
        push(&mut alerts, AlertEvent {
            kind: AlertKind::HighHeartRate,
            value: f32::from(reading.heart_rate()),
            threshold: f32::from(thresholds.heart_rate_limit()),
            timestamp: reading.timestamp(),
        });
    }

    if reading.temperature() > thresholds.temperature_limit() {
        push(&mut alerts, AlertEvent {
            kind: AlertKind::HighTemperature,
            value: reading.temperature(),
            threshold: thresholds.temperature_limit(),
            timestamp: reading.timestamp(),
        });
    }

    alerts
}

// Each kind is pushed at most once per reading
const _: () = assert!(MAX_ALERTS_PER_READING >= AlertKind::COUNT);

fn push(alerts: &mut Alerts, event: AlertEvent) {
    let pushed = alerts.push(event);
    debug_assert!(pushed.is_ok(), "alert buffer smaller than AlertKind::COUNT");
}
