use crate::core::InboundMessage;
use crate::error::Result;
use std::sync::Arc;

/// Called for every message a source receives. An `Err` means the message
/// was unreadable; the source logs it and moves on.
pub type MessageCallback = Arc<dyn Fn(&InboundMessage) -> Result<()> + Send + Sync>;

pub trait EventSource: Send + Sync {
    // Subscribe to the topics and invoke the callback for each message, on the source's own thread.
    fn subscribe(&self, topics: Vec<String>, callback: MessageCallback) -> Result<()>;

    // Stop the subscription.
    fn stop(&self) -> Result<()>;
}
