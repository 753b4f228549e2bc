//! MQTT transport for gateway-paired wearables
//!
//! Publishes each telemetry record to one topic with QoS 0. Publishing only
//! queues the record for rumqttc's event loop; the loop itself runs on a
//! background thread started with [`spawn_event_loop`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};
use rumqttc::{Client, ClientError, Connection, Event, MqttOptions, Packet, QoS};
use vitalwatch_core::Transport;

use crate::{ConnectionStats, ConnectorError};

/// Default topic for telemetry records
pub const DEFAULT_TOPIC: &str = "vitalwatch/telemetry";

/// Back-off after a connection error before the event loop reconnects
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Broker and session settings
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker host name or address
    pub host: String,
    /// Broker port
    pub port: u16,
    /// MQTT client identifier, unique per device
    pub client_id: String,
    /// Topic telemetry records are published to
    pub topic: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// Publishes queued ahead of the event loop before `send` reports busy
    pub queue_capacity: usize,
}

impl MqttConfig {
    /// Settings for `host:port` with the default topic
    pub fn new(host: impl Into<String>, port: u16, client_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: client_id.into(),
            topic: DEFAULT_TOPIC.to_string(),
            keep_alive_secs: 30,
            queue_capacity: 4,
        }
    }

    /// Publish to `topic` instead
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the publish queue depth
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        options
    }
}

/// Telemetry publisher
pub struct MqttTransport {
    client: Client,
    topic: String,
    connected: Arc<AtomicBool>,
    stats: ConnectionStats,
}

impl MqttTransport {
    /// Create the client. Nothing reaches the broker until the returned
    /// `Connection` is driven, usually by [`spawn_event_loop`].
    pub fn new(config: &MqttConfig) -> (Self, Connection) {
        let (client, connection) = Client::new(config.options(), config.queue_capacity.max(1));
        let transport = Self {
            client,
            topic: config.topic.clone(),
            connected: Arc::new(AtomicBool::new(false)),
            stats: ConnectionStats::default(),
        };
        (transport, connection)
    }

    /// Whether the event loop currently holds an acknowledged session
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Topic records are published to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Connection statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Drive `connection` on a background thread, keeping `is_connected` current
    pub fn spawn_event_loop(&self, mut connection: Connection) -> JoinHandle<()> {
        let connected = Arc::clone(&self.connected);

        thread::spawn(move || {
            for notification in connection.iter() {
                match notification {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("mqtt session established");
                        connected.store(true, Ordering::Relaxed);
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        connected.store(false, Ordering::Relaxed);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("mqtt connection error: {}", e);
                        connected.store(false, Ordering::Relaxed);
                        thread::sleep(RECONNECT_BACKOFF);
                    }
                }
            }
        })
    }
}

impl Transport for MqttTransport {
    type Error = ConnectorError;

    fn send(&mut self, payload: &[u8]) -> nb::Result<(), ConnectorError> {
        match self
            .client
            .try_publish(self.topic.as_str(), QoS::AtMostOnce, false, payload.to_vec())
        {
            Ok(()) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += payload.len() as u64;
                Ok(())
            }
            // Request queue full: the event loop is behind
            Err(ClientError::TryRequest(_)) => Err(nb::Error::WouldBlock),
            Err(e) => {
                self.stats.messages_failed += 1;
                Err(nb::Error::Other(ConnectorError::ProtocolError(e.to_string())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MqttConfig::new("localhost", 1883, "wearable-01");
        assert_eq!(config.topic, DEFAULT_TOPIC);
        assert_eq!(config.keep_alive_secs, 30);

        let config = config.with_topic("ward3/bed7").with_queue_capacity(2);
        assert_eq!(config.topic, "ward3/bed7");
        assert_eq!(config.queue_capacity, 2);
    }

    #[test]
    fn full_queue_reports_busy() {
        let config = MqttConfig::new("localhost", 1883, "wearable-01").with_queue_capacity(1);
        // Event loop never driven, so the first publish fills the queue
        let (mut transport, _connection) = MqttTransport::new(&config);

        assert!(transport.send(b"HR: 72 bpm").is_ok());
        assert!(matches!(transport.send(b"HR: 73 bpm"), Err(nb::Error::WouldBlock)));
        assert_eq!(transport.stats().messages_sent, 1);
        assert!(!transport.is_connected());
    }
}
