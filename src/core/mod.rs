//! Core data structures: repository events, event kinds and the well-known tokens.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

pub mod vocab;

pub use vocab::REPOSITORY_NAMESPACE;

/// Identifier message header
pub const IDENTIFIER_HEADER: &str = "http://fedora.info/definitions/v4/repository#identifier";

/// BaseURL message header
pub const BASE_URL_HEADER: &str = "http://fedora.info/definitions/v4/repository#baseURL";

/// Event type message header
pub const EVENT_TYPE_HEADER: &str = "http://fedora.info/definitions/v4/repository#eventType";

/// Properties message header (diagnostic only)
pub const PROPERTIES_HEADER: &str = "http://fedora.info/definitions/v4/repository#properties";

/// Event type that qualifies as a removal.
pub const REMOVAL_EVENT_TYPE: &str = "http://fedora.info/definitions/v4/repository#NODE_REMOVED";

/// Synthetic event type used for reindexing; never received from the repository.
pub const REINDEX_EVENT_TYPE: &str = "http://fedora.info/definitions/v4/repository#NODE_REINDEXED";

/// Event type used when a datastream update implies an update of its parent.
pub const PARENT_UPDATE_EVENT_TYPE: &str = "NODE_UPDATED";

/// The three kinds of change the dispatcher distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Removal,
    Reindex,
    Update,
}

impl EventKind {
    /// Classify an event type token. A missing token is an update.
    pub fn from_event_type(event_type: Option<&str>) -> Self {
        match event_type {
            Some(REMOVAL_EVENT_TYPE) => EventKind::Removal,
            Some(REINDEX_EVENT_TYPE) => EventKind::Reindex,
            _ => EventKind::Update,
        }
    }

    pub fn is_removal(self) -> bool {
        self == EventKind::Removal
    }
}

/// A message as handed over by a transport: an optional JSON body plus
/// whatever headers the transport carries natively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub payload: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl InboundMessage {
    pub fn from_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self { payload: payload.into(), headers: HashMap::new() }
    }
}

/// A repository change event: a flat map of string headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryEvent {
    headers: HashMap<String, String>,
}

impl RepositoryEvent {
    pub fn new(headers: HashMap<String, String>) -> Self {
        Self { headers }
    }

    /// Build an event from its three significant headers.
    pub fn from_parts(base_url: &str, identifier: &str, event_type: Option<&str>) -> Self {
        let mut headers = HashMap::new();
        headers.insert(BASE_URL_HEADER.to_string(), base_url.to_string());
        headers.insert(IDENTIFIER_HEADER.to_string(), identifier.to_string());
        if let Some(event_type) = event_type {
            headers.insert(EVENT_TYPE_HEADER.to_string(), event_type.to_string());
        }
        Self { headers }
    }

    /// Decode a transport message. A non-empty payload must be a JSON object;
    /// its members become headers (non-string values keep their JSON text).
    /// Transport headers are merged over the payload's.
    pub fn decode(message: &InboundMessage) -> Result<Self> {
        let mut headers = HashMap::new();

        if !message.payload.iter().all(u8::is_ascii_whitespace) {
            let Value::Object(members) = serde_json::from_slice::<Value>(&message.payload)? else {
                return Err(Error::UnreadableMessage("payload is not a JSON object".to_string()));
            };
            for (name, value) in members {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                headers.insert(name, value);
            }
        }

        headers.extend(message.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

        if headers.is_empty() {
            return Err(Error::UnreadableMessage("message carries no headers".to_string()));
        }
        Ok(Self { headers })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn identifier(&self) -> Option<&str> {
        self.header(IDENTIFIER_HEADER)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.header(BASE_URL_HEADER)
    }

    pub fn event_type(&self) -> Option<&str> {
        self.header(EVENT_TYPE_HEADER)
    }

    pub fn properties(&self) -> Option<&str> {
        self.header(PROPERTIES_HEADER)
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_event_type(self.event_type())
    }

    /// The affected resource, `baseURL + identifier`, when both headers are present.
    pub fn resource_uri(&self) -> Option<String> {
        match (self.base_url(), self.identifier()) {
            (Some(base), Some(id)) => Some(format!("{}{}", base, id)),
            _ => None,
        }
    }
}
