//! Error types for the indexing bridge

use thiserror::Error;

/// Result type alias for indexing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the indexing bridge
#[derive(Error, Debug)]
pub enum Error {
    /// An inbound message could not be decoded into event headers
    #[error("Unreadable message: {0}")]
    UnreadableMessage(String),

    /// Fetching or parsing a repository resource failed
    #[error("Retrieval error for {uri}: {message}")]
    Retrieval { uri: String, message: String },

    /// The resource declares no indexing transformation
    #[error("No indexing transformation declared for {0}")]
    AbsentTransform(String),

    /// A transform document could not be applied
    #[error("Transform error: {0}")]
    Transform(String),

    /// An indexer rejected an update or removal
    #[error("Indexer error: {0}")]
    Indexer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Event source (transport) error
    #[error("Source error: {0}")]
    Source(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn retrieval(uri: &str, message: impl Into<String>) -> Self {
        Error::Retrieval { uri: uri.to_string(), message: message.into() }
    }

    /// True for the "nothing to deliver" signal of the named-fields path.
    pub fn is_absent_transform(&self) -> bool {
        matches!(self, Error::AbsentTransform(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::UnreadableMessage(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
