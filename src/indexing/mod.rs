//! Downstream indexes and the contract the dispatcher drives them through.

use crate::error::Result;
use crate::fetching::NamedFields;
use oxigraph::model::Graph;
use std::fmt;

pub mod file;
pub mod sparql;

pub use file::{FileFormat, FileSerializer};
pub use sparql::{SparqlUpdateIndexer, StoreProtocol};

/// The content shape an indexer wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerType {
    /// The resource's RDF model
    Rdf,
    /// Fields produced by the resource's indexing transformation
    NamedFields,
    /// Nothing; the indexer works from the URI alone
    Other,
}

impl fmt::Display for IndexerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexerType::Rdf => write!(f, "RDF"),
            IndexerType::NamedFields => write!(f, "NAMEDFIELDS"),
            IndexerType::Other => write!(f, "OTHER"),
        }
    }
}

/// Content handed to [`Indexer::update`].
#[derive(Debug, Clone, Copy)]
pub enum IndexContent<'a> {
    Rdf(&'a Graph),
    NamedFields(&'a NamedFields),
    None,
}

impl<'a> IndexContent<'a> {
    pub fn shape(&self) -> IndexerType {
        match self {
            IndexContent::Rdf(_) => IndexerType::Rdf,
            IndexContent::NamedFields(_) => IndexerType::NamedFields,
            IndexContent::None => IndexerType::Other,
        }
    }
}

/// A downstream index. Implementations are shared between concurrently
/// handled events and must tolerate parallel `update`/`remove` calls.
pub trait Indexer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn indexer_type(&self) -> IndexerType;

    /// Index (or re-index) the resource at `uri`.
    fn update(&self, uri: &str, content: IndexContent<'_>) -> Result<()>;

    /// Drop the resource at `uri` from the index.
    fn remove(&self, uri: &str) -> Result<()>;
}

/// Reject content of the wrong shape with an indexer error.
pub(crate) fn unexpected_content(indexer: &str, expected: IndexerType, got: &IndexContent<'_>) -> crate::Error {
    crate::Error::Indexer(format!("{} expects {} content, received {}", indexer, expected, got.shape()))
}
