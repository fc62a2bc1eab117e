//! Derivation of named fields from a resource's RDF.
//!
//! A resource opts in by pointing `indexing:hasIndexingTransformation` at a
//! transform document held by the repository. The transform is a SPARQL
//! `SELECT` query evaluated over the resource's own triples: each projected
//! variable names a field, and every value bound to it, row by row, is
//! appended to that field.

use super::rdf_fetcher::iri_objects;
use super::repository::Repository;
use crate::core::vocab::HAS_INDEXING_TRANSFORMATION;
use crate::error::{Error, Result};
use oxigraph::model::{Graph, GraphNameRef, Term};
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use serde::Serialize;
use std::collections::BTreeMap;

/// Accept header sent when retrieving a transform document.
pub const TRANSFORM_ACCEPT: &str = "application/sparql-query, text/plain;q=0.5, */*;q=0.1";

/// Field name to ordered values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NamedFields(BTreeMap<String, Vec<String>>);

impl NamedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, value: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(value.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Produces the named fields of one resource from its (shared) RDF.
pub struct NamedFieldsFetcher<'a, 'g> {
    uri: &'a str,
    repository: &'a dyn Repository,
    rdf: &'a dyn Fn() -> Result<&'g Graph>,
}

impl<'a, 'g> NamedFieldsFetcher<'a, 'g> {
    pub fn new(
        uri: &'a str,
        repository: &'a dyn Repository,
        rdf: &'a dyn Fn() -> Result<&'g Graph>,
    ) -> Self {
        Self { uri, repository, rdf }
    }

    /// Fails with [`Error::AbsentTransform`] when the resource names no transform.
    pub fn fetch(&self) -> Result<NamedFields> {
        let graph = (self.rdf)()?;

        let transform_uri = iri_objects(graph, self.uri, HAS_INDEXING_TRANSFORMATION)
            .into_iter()
            .next()
            .ok_or_else(|| Error::AbsentTransform(self.uri.to_string()))?;

        tracing::debug!(uri = %self.uri, transform = %transform_uri, "Retrieving indexing transformation");
        let transform = self.repository.get(&transform_uri, TRANSFORM_ACCEPT)?.text()?;

        apply_transform(&transform, graph)
            .map_err(|e| Error::Transform(format!("{} applied to {}: {}", transform_uri, self.uri, e)))
    }
}

/// Evaluate a SELECT transform over `graph`.
pub fn apply_transform(transform: &str, graph: &Graph) -> Result<NamedFields> {
    let store = Store::new().map_err(|e| Error::Transform(e.to_string()))?;
    for triple in graph.iter() {
        store
            .insert(triple.in_graph(GraphNameRef::DefaultGraph))
            .map_err(|e| Error::Transform(e.to_string()))?;
    }

    let evaluator = SparqlEvaluator::new();
    let parsed_query =
        evaluator.parse_query(transform).map_err(|e| Error::Transform(e.to_string()))?;
    let results =
        parsed_query.on_store(&store).execute().map_err(|e| Error::Transform(e.to_string()))?;

    let QueryResults::Solutions(solutions) = results else {
        return Err(Error::Transform("transform is not a SELECT query".to_string()));
    };

    let mut fields = NamedFields::new();
    for solution in solutions {
        let solution = solution.map_err(|e| Error::Transform(e.to_string()))?;
        for (var, term) in solution.iter() {
            fields.push(var.as_str(), field_value(term));
        }
    }
    Ok(fields)
}

fn field_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}
