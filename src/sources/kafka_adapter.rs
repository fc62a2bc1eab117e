use super::event_source::{EventSource, MessageCallback};
use crate::core::InboundMessage;
use crate::error::{Error, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::message::{BorrowedMessage, Headers, Message};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the Kafka event source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaSourceConfig {
    /// Comma-separated list of the Kafka brokers
    pub brokers: String,
    /// The consumer group id for offset management
    pub group_id: String,
    /// Offset reset policy ("earliest" or "latest")
    pub auto_offset_reset: String,
}

impl Default for KafkaSourceConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "fedora_indexer".to_string(),
            auto_offset_reset: "latest".to_string(),
        }
    }
}

pub struct KafkaSource {
    consumer: Arc<BaseConsumer>,
    running: Arc<AtomicBool>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl KafkaSource {
    pub fn new(config: &KafkaSourceConfig) -> Result<Self> {
        let consumer: BaseConsumer = ClientConfig::new()
            .set("group.id", &config.group_id)
            .set("bootstrap.servers", &config.brokers)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", &config.auto_offset_reset)
            .create()
            .map_err(|e| Error::Source(e.to_string()))?;

        Ok(KafkaSource {
            consumer: Arc::new(consumer),
            running: Arc::new(AtomicBool::new(false)),
            poller: Mutex::new(None),
        })
    }
}

/// Payload plus UTF-8 record headers.
fn inbound_message(record: &BorrowedMessage<'_>) -> InboundMessage {
    let mut headers = HashMap::new();
    if let Some(record_headers) = record.headers() {
        for header in record_headers.iter() {
            if let Some(value) = header.value.and_then(|v| std::str::from_utf8(v).ok()) {
                headers.insert(header.key.to_string(), value.to_string());
            }
        }
    }
    InboundMessage { payload: record.payload().map(<[u8]>::to_vec).unwrap_or_default(), headers }
}

impl EventSource for KafkaSource {
    fn subscribe(&self, topics: Vec<String>, callback: MessageCallback) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::Source("Kafka source is already subscribed".to_string()));
        }

        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        if let Err(e) = self.consumer.subscribe(&topic_refs) {
            self.running.store(false, Ordering::SeqCst);
            return Err(Error::Source(e.to_string()));
        }

        let consumer = Arc::clone(&self.consumer);
        let running = Arc::clone(&self.running);
        let handle = thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                match consumer.poll(Duration::from_millis(250)) {
                    None => {}
                    Some(Ok(record)) => {
                        let message = inbound_message(&record);
                        // the offset is auto-committed, so an unreadable message is dropped for good
                        if let Err(e) = callback(&message) {
                            tracing::warn!(
                                topic = record.topic(),
                                offset = record.offset(),
                                error = %e,
                                "Dropping Kafka message"
                            );
                        }
                    }
                    Some(Err(e)) => tracing::error!(error = %e, "Kafka poll error"),
                }
            }
            tracing::info!("Kafka poller stopped");
        });

        if let Ok(mut poller) = self.poller.lock() {
            *poller = Some(handle);
        }
        tracing::info!(?topics, "Subscribed to Kafka topics");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.poller.lock().ok().and_then(|mut p| p.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        self.consumer.unsubscribe();
        Ok(())
    }
}
