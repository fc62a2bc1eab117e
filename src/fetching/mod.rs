//! Retrieval of resource representations from the repository.

pub mod memoized;
pub mod memory;
pub mod named_fields;
pub mod rdf_fetcher;
pub mod repository;

pub use memoized::Memoized;
pub use memory::MemoryRepository;
pub use named_fields::{apply_transform, NamedFields, NamedFieldsFetcher};
pub use rdf_fetcher::{asserts_type, iri_objects, parse_rdf, ResourceFetcher, RDF_ACCEPT};
pub use repository::{Credentials, HttpRepository, Repository, RepositoryResponse};
