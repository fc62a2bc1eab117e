use super::event_source::{EventSource, MessageCallback};
use crate::core::InboundMessage;
use crate::dispatch::IndexerGroup;
use crate::error::Result;
use std::sync::Arc;

/// Connects event sources to an indexer group.
pub struct EventPipeline {
    group: Arc<IndexerGroup>,
    sources: Vec<Box<dyn EventSource>>,
}

impl EventPipeline {
    pub fn new(group: Arc<IndexerGroup>) -> Self {
        EventPipeline { group, sources: Vec::new() }
    }

    /// Add a source to the pipeline (MQTT, Kafka, ...)
    pub fn add_source(&mut self, source: Box<dyn EventSource>) {
        self.sources.push(source);
    }

    /// Subscribe every source to `topics`. Messages are dispatched on the
    /// source's delivery thread.
    pub fn start(&self, topics: Vec<String>) -> Result<()> {
        let group = Arc::clone(&self.group);
        let callback: MessageCallback =
            Arc::new(move |message: &InboundMessage| group.on_message(message));

        for source in &self.sources {
            source.subscribe(topics.clone(), Arc::clone(&callback))?;
        }
        tracing::info!(sources = self.sources.len(), ?topics, "Event pipeline started");
        Ok(())
    }

    /// Stop every source; the first failure is returned after all were asked to stop.
    pub fn stop(&self) -> Result<()> {
        let mut first_error = None;
        for source in &self.sources {
            if let Err(e) = source.stop() {
                tracing::warn!(error = %e, "Failed to stop event source");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
