//! End-to-end tests for the polling loop
//!
//! Each test wires the real reader, evaluator, sink, formatter and driver to
//! simulated hardware and runs whole cycles.

mod common;

use common::{alert_log, decicelsius_config, RecordingLink, Sample, ScriptedAdc, SimClock, SimDelay};
use vitalwatch_core::{
    AlertKind, DedupPolicy, Monitor, MonitorConfig, MonitorError, MonitorState, Operation,
    StopReason, StopSignal,
};

#[test]
fn high_heart_rate_scenario() {
    let clock = SimClock::default();
    let adc = ScriptedAdc::new(&clock, [Sample::Pair(101, 360)]);
    let link = RecordingLink::default();
    let sent = link.sent.clone();
    let (alerts, notifier) = alert_log();

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        link,
        notifier,
        clock.clone(),
        SimDelay::new(&clock),
    )
    .unwrap();

    let report = monitor.run_cycle();

    assert!(report.error.is_none());
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].kind, AlertKind::HighHeartRate);
    assert_eq!(report.alerts[0].value, 101.0);
    assert_eq!(sent.borrow().as_slice(), ["HR: 101 bpm, Temp: 36.00 °C"]);
    assert_eq!(alerts.borrow().len(), 1);
}

#[test]
fn high_temperature_scenario() {
    let clock = SimClock::default();
    let adc = ScriptedAdc::new(&clock, [Sample::Pair(90, 380)]);
    let (alerts, notifier) = alert_log();

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        RecordingLink::default(),
        notifier,
        clock.clone(),
        SimDelay::new(&clock),
    )
    .unwrap();

    let report = monitor.run_cycle();

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].kind, AlertKind::HighTemperature);
    assert_eq!(report.alerts[0].value, 38.0);
    assert_eq!(alerts.borrow()[0].kind, AlertKind::HighTemperature);
}

#[test]
fn transport_failure_does_not_stop_monitoring() {
    let clock = SimClock::default();
    let adc = ScriptedAdc::new(&clock, [Sample::Pair(72, 365), Sample::Pair(74, 366)]);
    let link = RecordingLink::new([Err(())]);
    let sent = link.sent.clone();
    let (_, notifier) = alert_log();

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        link,
        notifier,
        clock.clone(),
        SimDelay::new(&clock),
    )
    .unwrap();

    let summary = monitor.run(&StopSignal::new(), Some(2));

    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.failed_cycles, 1);
    assert_eq!(summary.reason, StopReason::CycleLimit);

    let stats = monitor.stats();
    assert_eq!(stats.transmit_errors, 1);
    assert_eq!(stats.transmitted, 1);
    assert_eq!(sent.borrow().as_slice(), ["HR: 74 bpm, Temp: 36.60 °C"]);
}

#[test]
fn sleeps_for_remainder_of_cadence() {
    let clock = SimClock::default();
    // Two polls per cycle at 30 ms each
    let adc = ScriptedAdc::new(&clock, [Sample::Pair(70, 360)]).with_poll_cost(30);
    let delay = SimDelay::new(&clock);
    let slept = delay.slept.clone();
    let (_, notifier) = alert_log();

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        RecordingLink::default(),
        notifier,
        clock.clone(),
        delay,
    )
    .unwrap();

    monitor.run(&StopSignal::new(), Some(3));

    assert_eq!(slept.borrow().as_slice(), [940, 940]);
    assert_eq!(vitalwatch_core::TimeSource::now(&clock), 3 * 60 + 2 * 940);
}

#[test]
fn overrunning_cycle_skips_sleep() {
    let clock = SimClock::default();
    let config = MonitorConfig {
        cadence_ms: 100,
        read_timeout_ms: 100,
        transmit_timeout_ms: 100,
        ..decicelsius_config()
    };
    let adc = ScriptedAdc::new(&clock, [Sample::Pair(70, 360)]).with_poll_cost(80);
    let delay = SimDelay::new(&clock);
    let slept = delay.slept.clone();
    let (_, notifier) = alert_log();

    let mut monitor = Monitor::new(config, adc, RecordingLink::default(), notifier, clock.clone(), delay)
        .unwrap();

    monitor.run(&StopSignal::new(), Some(2));

    assert!(slept.borrow().is_empty());
    assert_eq!(monitor.stats().overruns, 1);
}

#[test]
fn stalled_adc_times_out_and_recovers() {
    let clock = SimClock::default();
    let adc = ScriptedAdc::new(
        &clock,
        [Sample::Stall { ms: 200 }, Sample::Pair(80, 365)],
    );
    let (_, notifier) = alert_log();

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        RecordingLink::default(),
        notifier,
        clock.clone(),
        SimDelay::new(&clock),
    )
    .unwrap();

    let summary = monitor.run(&StopSignal::new(), Some(2));

    assert_eq!(summary.failed_cycles, 1);
    let stats = monitor.stats();
    assert_eq!(stats.timeouts, 1);
    assert_eq!(stats.readings, 1);
    assert_eq!(stats.transmitted, 1);
}

#[test]
fn hardware_fault_reported_in_cycle() {
    let clock = SimClock::default();
    let adc = ScriptedAdc::new(&clock, [Sample::Fault, Sample::Pair(80, 365)]);
    let (_, notifier) = alert_log();

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        RecordingLink::default(),
        notifier,
        clock.clone(),
        SimDelay::new(&clock),
    )
    .unwrap();

    let first = monitor.run_cycle();
    assert_eq!(
        first.error,
        Some(MonitorError::SensorFault { channel: 0x01, reason: "acquisition failed" })
    );
    assert!(first.error.unwrap().is_sensor_side());

    let second = monitor.run_cycle();
    assert!(second.error.is_none());
    assert!(second.transmitted);
}

#[test]
fn stop_signal_from_notifier_ends_run() {
    let clock = SimClock::default();
    let adc = ScriptedAdc::new(
        &clock,
        [Sample::Pair(70, 360), Sample::Pair(70, 360), Sample::Pair(130, 360), Sample::Pair(70, 360)],
    );
    let stop = StopSignal::new();

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        RecordingLink::default(),
        |_: &vitalwatch_core::AlertEvent| stop.stop(),
        clock.clone(),
        SimDelay::new(&clock),
    )
    .unwrap();

    let summary = monitor.run(&stop, None);

    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.reason, StopReason::Signalled);
    assert_eq!(monitor.state(), MonitorState::Idle);
}

#[test]
fn cooldown_from_config_reaches_sink() {
    let clock = SimClock::default();
    let adc = ScriptedAdc::new(&clock, [Sample::Pair(120, 360)]);
    let (alerts, notifier) = alert_log();
    let config = MonitorConfig {
        dedup: DedupPolicy::Cooldown { window_ms: 5_000 },
        ..decicelsius_config()
    };

    let mut monitor =
        Monitor::new(config, adc, RecordingLink::default(), notifier, clock.clone(), SimDelay::new(&clock))
            .unwrap();

    // Roughly 1 s per cycle: alerts at t≈0 and t≈5 s get through
    monitor.run(&StopSignal::new(), Some(7));

    assert_eq!(monitor.stats().alerts, 7);
    assert_eq!(alerts.borrow().len(), 2);
    assert_eq!(monitor.sink().stats().suppressed, 5);
    assert_eq!(monitor.sink_mut().pop_pending().map(|e| e.kind), Some(AlertKind::HighHeartRate));
}

#[test]
fn json_config_drives_monitor() {
    let config = MonitorConfig::from_json(
        r#"{
            "thresholds": { "heart_rate_limit": 150, "temperature_limit": 38.5 },
            "cadence_ms": 500,
            "read_timeout_ms": 20,
            "transmit_timeout_ms": 100
        }"#,
    )
    .unwrap();

    let clock = SimClock::default();
    let adc = ScriptedAdc::new(&clock, [Sample::Pair(120, 370)]);
    let (alerts, notifier) = alert_log();

    let mut monitor =
        Monitor::new(config, adc, RecordingLink::default(), notifier, clock.clone(), SimDelay::new(&clock))
            .unwrap();

    let report = monitor.run_cycle();
    assert!(report.error.is_none());
    assert!(report.alerts.is_empty());
    assert!(alerts.borrow().is_empty());
    assert_eq!(monitor.config().cadence_ms, 500);
}

#[test]
fn transmit_timeout_is_classified() {
    struct BusyLink;

    impl vitalwatch_core::Transport for BusyLink {
        type Error = ();

        fn send(&mut self, _payload: &[u8]) -> nb::Result<(), ()> {
            Err(nb::Error::WouldBlock)
        }
    }

    let clock = vitalwatch_core::time::SteppingTime::new(0, 1);
    let (_, notifier) = alert_log();
    let sim = SimClock::default();
    let adc = ScriptedAdc::new(&sim, [Sample::Pair(70, 360)]);

    let mut monitor = Monitor::new(
        decicelsius_config(),
        adc,
        BusyLink,
        notifier,
        &clock,
        SimDelay::new(&sim),
    )
    .unwrap();

    let report = monitor.run_cycle();
    assert!(report.reading.is_some());
    assert_eq!(report.error, Some(MonitorError::Timeout { operation: Operation::Transmit }));
}
