//! RDF terms the dispatcher and reindexer look for in resource descriptions.

use oxigraph::model::NamedNodeRef;

pub use oxigraph::model::vocab::rdf::TYPE as RDF_TYPE;

pub const REPOSITORY_NAMESPACE: &str = "http://fedora.info/definitions/v4/repository#";

pub const RESTAPI_NAMESPACE: &str = "http://fedora.info/definitions/v4/rest-api#";

pub const INDEXER_NAMESPACE: &str = "http://fedora.info/definitions/v4/indexing#";

/// Marks a resource as indexable.
pub const INDEXABLE: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/indexing#indexable");

/// Points at the transformation used to derive named fields from a resource.
pub const HAS_INDEXING_TRANSFORMATION: NamedNodeRef<'static> = NamedNodeRef::new_unchecked(
    "http://fedora.info/definitions/v4/indexing#hasIndexingTransformation",
);

/// Marks a resource as a datastream.
pub const DATASTREAM: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/rest-api#datastream");

pub const HAS_CHILD: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://fedora.info/definitions/v4/repository#hasChild");
