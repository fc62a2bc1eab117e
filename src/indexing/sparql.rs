//! Triple-store indexer speaking SPARQL 1.1 Update over HTTP (Apache Jena
//! Fuseki, Oxigraph server, ...).

use super::{unexpected_content, IndexContent, Indexer, IndexerType};
use crate::error::{Error, Result};
use oxigraph::model::{Graph, NamedNode};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::fmt::Write as _;
use std::time::Duration;

/// How the store expects update requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProtocol {
    /// Raw `application/sparql-update` body
    #[default]
    Oxigraph,
    /// Form-encoded `update=` parameter
    Jena,
}

pub struct SparqlUpdateIndexer {
    name: String,
    endpoint: String,
    protocol: StoreProtocol,
    auth_token: Option<String>,
    client: Client,
}

impl SparqlUpdateIndexer {
    pub fn new(endpoint: &str, protocol: StoreProtocol, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build SPARQL client: {}", e)))?;

        Ok(Self {
            name: format!("sparql:{}", endpoint),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            protocol,
            auth_token: None,
            client,
        })
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    fn update_endpoint(&self) -> String {
        format!("{}/update", self.endpoint)
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.auth_token {
            request.header(AUTHORIZATION, format!("Bearer {}", token))
        } else {
            request
        }
    }

    fn post_update(&self, sparql_update: &str) -> Result<()> {
        let request = self.add_auth_header(self.client.post(self.update_endpoint()));
        let request = match self.protocol {
            StoreProtocol::Jena => request.form(&[("update", sparql_update)]),
            StoreProtocol::Oxigraph => request
                .header(CONTENT_TYPE, "application/sparql-update")
                .body(sparql_update.to_string()),
        };

        let response = request.send().map_err(|e| Error::Indexer(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Indexer(format!("Update failed with status {}: {}", status, error_body)));
        }
        Ok(())
    }
}

fn subject_node(uri: &str) -> Result<NamedNode> {
    NamedNode::new(uri).map_err(|e| Error::Indexer(format!("cannot index {}: {}", uri, e)))
}

/// Remove everything asserted about `uri`.
pub fn delete_request(uri: &str) -> Result<String> {
    Ok(format!("DELETE WHERE {{ {} ?p ?o }}", subject_node(uri)?))
}

/// Replace everything asserted about `uri` with the triples of `graph`.
pub fn replace_request(uri: &str, graph: &Graph) -> Result<String> {
    let mut update = delete_request(uri)?;
    if graph.is_empty() {
        return Ok(update);
    }
    update.push_str(";\nINSERT DATA {\n");
    for triple in graph.iter() {
        let _ = writeln!(update, "  {} .", triple);
    }
    update.push('}');
    Ok(update)
}

impl Indexer for SparqlUpdateIndexer {
    fn name(&self) -> &str {
        &self.name
    }

    fn indexer_type(&self) -> IndexerType {
        IndexerType::Rdf
    }

    fn update(&self, uri: &str, content: IndexContent<'_>) -> Result<()> {
        let IndexContent::Rdf(graph) = content else {
            return Err(unexpected_content(&self.name, IndexerType::Rdf, &content));
        };
        tracing::debug!(uri = %uri, triples = graph.len(), endpoint = %self.endpoint, "Replacing triples");
        self.post_update(&replace_request(uri, graph)?)
    }

    fn remove(&self, uri: &str) -> Result<()> {
        tracing::debug!(uri = %uri, endpoint = %self.endpoint, "Deleting triples");
        self.post_update(&delete_request(uri)?)
    }
}
