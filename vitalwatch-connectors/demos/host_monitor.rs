//! Run the monitor on a host against a simulated ADC, streaming telemetry
//! lines to stdout.
//!
//! ```text
//! cargo run -p vitalwatch-connectors --example host_monitor -- 10
//! ```
//!
//! The optional argument is the number of cycles (default 8).

use std::io;

use vitalwatch_connectors::SerialTransport;
use vitalwatch_core::{
    constants::{HEART_RATE_CHANNEL, TEMPERATURE_CHANNEL},
    AdcChannel, AlertEvent, ChannelId, Monitor, MonitorConfig, StdClock, StopSignal,
    ThreadDelay,
};

/// Heart rate climbing through the default limit while a fever develops,
/// then starting over
struct SimulatedAdc {
    sample: u16,
}

impl AdcChannel for SimulatedAdc {
    type Error = ();

    fn read_channel(&mut self, channel: ChannelId) -> nb::Result<u16, ()> {
        match channel {
            HEART_RATE_CHANNEL => {
                self.sample = (self.sample + 1) % 16;
                Ok(88 + 3 * self.sample)
            }
            // Default calibration: raw / 1024 * 100 °C
            TEMPERATURE_CHANNEL => Ok(375 + 2 * self.sample),
            _ => Err(nb::Error::Other(())),
        }
    }
}

fn main() {
    let cycles = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(8);

    let config = MonitorConfig {
        cadence_ms: 250,
        ..MonitorConfig::default()
    };

    let notifier = |event: &AlertEvent| eprintln!("ALERT {}", event);

    let mut monitor = match Monitor::new(
        config,
        SimulatedAdc { sample: 0 },
        SerialTransport::new(io::stdout()),
        notifier,
        StdClock::new(),
        ThreadDelay,
    ) {
        Ok(monitor) => monitor,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let summary = monitor.run(&StopSignal::new(), Some(cycles));
    let stats = monitor.stats();

    eprintln!(
        "{} cycles ({} failed), {} alerts, {} records sent",
        summary.cycles, summary.failed_cycles, stats.alerts, stats.transmitted
    );
}
