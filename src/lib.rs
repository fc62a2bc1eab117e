//! # Fedora Indexer
//!
//! An event-driven bridge between a Fedora repository and the indexes built
//! from it. Every repository change event is translated into update or remove
//! calls on each registered indexer, with the resource content fetched once and
//! handed over in the shape each indexer accepts.
//!
//! ## Features
//!
//! - Memoized retrieval of a resource's RDF and its named-fields transform
//! - Indexable filtering and datastream-to-parent cascades
//! - Cycle-safe recursive reindexing along `hasChild`
//! - MQTT and Kafka event sources, SPARQL Update and file indexers
//!
//! ## Example
//!
//! ```rust,no_run
//! use fedora_indexer::indexing::{FileFormat, FileSerializer, Indexer};
//! use fedora_indexer::{IndexerGroup, Result};
//! use std::sync::Arc;
//!
//! fn example() -> Result<()> {
//!     let indexer: Arc<dyn Indexer> = Arc::new(FileSerializer::new("fields", FileFormat::NamedFields)?);
//!     let group = IndexerGroup::new("http://localhost:8080/rest/", vec![indexer], None)?;
//!     group.reindex_all();
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::new_without_default)]

/// Core data structures and types
pub mod core;

pub mod error;

/// Retrieval of RDF and named fields from the repository
pub mod fetching;

/// Indexer contract and the bundled indexers
pub mod indexing;

/// Event dispatch and reindexing
pub mod dispatch;

/// Event transports
pub mod sources;

/// HTTP control server
pub mod http;

/// Configuration file
pub mod config;

// Re-export commonly used types
pub use config::IndexerConfig;
pub use crate::core::{InboundMessage, RepositoryEvent};
pub use dispatch::{DispatchOutcome, IndexerGroup, ReindexReport};
pub use error::{Error, Result};
pub use indexing::{IndexContent, Indexer, IndexerType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("test error".to_string());
        assert_eq!(format!("{}", err), "Configuration error: test error");
    }
}
