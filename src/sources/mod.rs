//! Transports that deliver repository events to the dispatcher.

pub mod event_pipeline;
pub mod event_source;
#[cfg(not(windows))]
pub mod kafka_adapter;
pub mod mqtt_adapter;

pub use event_pipeline::EventPipeline;
pub use event_source::{EventSource, MessageCallback};
#[cfg(not(windows))]
pub use kafka_adapter::{KafkaSource, KafkaSourceConfig};
pub use mqtt_adapter::{MqttSource, MqttSourceConfig};
