//! Retrieval of a resource's RDF description.

use super::repository::{Repository, RepositoryResponse};
use crate::core::vocab::RDF_TYPE;
use crate::error::{Error, Result};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Graph, NamedNodeRef, TermRef, Triple, TripleRef};

/// Accept header sent when asking the repository for RDF.
pub const RDF_ACCEPT: &str = "text/turtle, application/n-triples;q=0.9, application/rdf+xml;q=0.8";

/// Fetches and parses the RDF of one resource.
pub struct ResourceFetcher<'a> {
    uri: &'a str,
    repository: &'a dyn Repository,
}

impl<'a> ResourceFetcher<'a> {
    pub fn new(uri: &'a str, repository: &'a dyn Repository) -> Self {
        Self { uri, repository }
    }

    pub fn uri(&self) -> &str {
        self.uri
    }

    pub fn fetch(&self) -> Result<Graph> {
        tracing::debug!(uri = %self.uri, "Retrieving RDF");
        let response = self.repository.get(self.uri, RDF_ACCEPT)?;
        parse_rdf(self.uri, &response)
    }
}

/// Parse a repository response into a graph. The response's media type picks
/// the syntax (Turtle when absent or unknown) and `uri` is the base IRI.
/// Quads in named graphs are folded into the default graph.
pub fn parse_rdf(uri: &str, response: &RepositoryResponse) -> Result<Graph> {
    let format = response
        .media_type()
        .and_then(|mt| RdfFormat::from_media_type(&mt))
        .unwrap_or(RdfFormat::Turtle);

    let parser = RdfParser::from_format(format)
        .with_base_iri(uri)
        .map_err(|e| Error::retrieval(uri, format!("invalid base IRI: {}", e)))?;

    let mut graph = Graph::new();
    for quad in parser.for_reader(response.body.as_slice()) {
        let quad = quad.map_err(|e| Error::retrieval(uri, format!("unparseable RDF: {}", e)))?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

/// Whether `graph` states `<uri> rdf:type <class>`.
pub fn asserts_type(graph: &Graph, uri: &str, class: NamedNodeRef<'_>) -> bool {
    match NamedNodeRef::new(uri) {
        Ok(subject) => graph.contains(TripleRef::new(subject, RDF_TYPE, class)),
        Err(_) => false,
    }
}

/// IRI objects of `<uri> <predicate> ?o`, in graph iteration order.
pub fn iri_objects(graph: &Graph, uri: &str, predicate: NamedNodeRef<'_>) -> Vec<String> {
    let Ok(subject) = NamedNodeRef::new(uri) else {
        return Vec::new();
    };
    graph
        .objects_for_subject_predicate(subject, predicate)
        .filter_map(|object| match object {
            TermRef::NamedNode(node) => Some(node.as_str().to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::{DATASTREAM, HAS_CHILD, INDEXABLE};
    use crate::fetching::memory::MemoryRepository;

    const TURTLE: &str = r#"
        @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
        @prefix indexing: <http://fedora.info/definitions/v4/indexing#> .
        @prefix fedora: <http://fedora.info/definitions/v4/repository#> .
        <http://r/obj> rdf:type indexing:indexable ;
            fedora:hasChild <http://r/obj/a>, <child-b>, "not a node" .
    "#;

    #[test]
    fn test_fetch_parses_turtle() {
        let repo = MemoryRepository::new();
        repo.insert_turtle("http://r/obj", TURTLE);

        let graph = ResourceFetcher::new("http://r/obj", &repo).fetch().unwrap();
        assert_eq!(graph.len(), 4);
        assert!(asserts_type(&graph, "http://r/obj", INDEXABLE));
        assert!(!asserts_type(&graph, "http://r/obj", DATASTREAM));
    }

    #[test]
    fn test_relative_iris_resolve_against_resource() {
        let repo = MemoryRepository::new();
        repo.insert_turtle("http://r/obj", TURTLE);

        let graph = ResourceFetcher::new("http://r/obj", &repo).fetch().unwrap();
        let mut children = iri_objects(&graph, "http://r/obj", HAS_CHILD);
        children.sort();
        assert_eq!(children, vec!["http://r/child-b".to_string(), "http://r/obj/a".to_string()]);
    }

    #[test]
    fn test_ntriples_selected_by_content_type() {
        let body = "<http://r/x> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://fedora.info/definitions/v4/rest-api#datastream> .\n";
        let response = RepositoryResponse::new(Some("application/n-triples"), body);

        let graph = parse_rdf("http://r/x", &response).unwrap();
        assert!(asserts_type(&graph, "http://r/x", DATASTREAM));
    }

    #[test]
    fn test_malformed_rdf_is_retrieval_error() {
        let response = RepositoryResponse::new(Some("text/turtle"), "<http://r/x> this is not turtle");
        let err = parse_rdf("http://r/x", &response).unwrap_err();
        assert!(matches!(err, Error::Retrieval { .. }));
    }

    #[test]
    fn test_missing_resource_is_retrieval_error() {
        let repo = MemoryRepository::new();
        let err = ResourceFetcher::new("http://r/none", &repo).fetch().unwrap_err();
        assert!(matches!(err, Error::Retrieval { .. }));
    }
}
