use super::event_source::{EventSource, MessageCallback};
use crate::core::InboundMessage;
use crate::error::{Error, Result};
use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the MQTT event source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

impl Default for MqttSourceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "fedora_indexer".to_string(),
            keep_alive_secs: 30,
        }
    }
}

pub struct MqttSource {
    client: Client,
    connection: Mutex<Option<Connection>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    should_stop: Arc<AtomicBool>,
}

impl MqttSource {
    pub fn new(config: &MqttSourceConfig) -> Result<Self> {
        let mut mqtt_options = MqttOptions::new(&config.client_id, &config.host, config.port);
        mqtt_options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        let (client, connection) = Client::new(mqtt_options, 10);

        Ok(MqttSource {
            client,
            connection: Mutex::new(Some(connection)),
            listener: Mutex::new(None),
            should_stop: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl EventSource for MqttSource {
    fn subscribe(&self, topics: Vec<String>, callback: MessageCallback) -> Result<()> {
        for topic in &topics {
            self.client
                .subscribe(topic, QoS::AtLeastOnce)
                .map_err(|e| Error::Source(format!("MQTT subscribe to {}: {}", topic, e)))?;
        }

        let mut connection = self
            .connection
            .lock()
            .map_err(|_| Error::Source("MQTT connection lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| Error::Source("MQTT source is already subscribed".to_string()))?;

        let should_stop = Arc::clone(&self.should_stop);
        let handle = thread::spawn(move || {
            for notification in connection.iter() {
                if should_stop.load(Ordering::Relaxed) {
                    break;
                }
                match notification {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        tracing::debug!(topic = %publish.topic, bytes = publish.payload.len(), "MQTT message received");
                        let message = InboundMessage::from_payload(publish.payload.to_vec());
                        if let Err(e) = callback(&message) {
                            tracing::warn!(topic = %publish.topic, error = %e, "Dropping MQTT message");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "MQTT connection error");
                        // the next iteration reconnects
                        thread::sleep(Duration::from_secs(1));
                    }
                }
            }
            tracing::info!("MQTT listener stopped");
        });

        if let Ok(mut listener) = self.listener.lock() {
            *listener = Some(handle);
        }
        tracing::info!(?topics, "Subscribed to MQTT topics");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.should_stop.store(true, Ordering::Relaxed);
        self.client.disconnect().map_err(|e| Error::Source(e.to_string()))?;

        let handle = self.listener.lock().ok().and_then(|mut l| l.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        Ok(())
    }
}
