//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use fedora_indexer::fetching::{MemoryRepository, Repository};
use fedora_indexer::{Error, IndexContent, Indexer, IndexerGroup, IndexerType, Result};
use std::sync::{Arc, Mutex};

pub const ROOT: &str = "http://r/";

pub const PREFIXES: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix indexing: <http://fedora.info/definitions/v4/indexing#> .
@prefix repo: <http://fedora.info/definitions/v4/repository#> .
@prefix restapi: <http://fedora.info/definitions/v4/rest-api#> .
@prefix dc: <http://purl.org/dc/elements/1.1/> .
"#;

/// Transform producing a `title` field from `dc:title`.
pub const TITLE_TRANSFORM: &str = r#"
PREFIX dc: <http://purl.org/dc/elements/1.1/>
SELECT ?title WHERE { ?s dc:title ?title }
"#;

/// One call an indexer received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Update { uri: String, triples: usize, fields: Vec<(String, Vec<String>)> },
    Remove { uri: String },
}

impl Call {
    pub fn uri(&self) -> &str {
        match self {
            Call::Update { uri, .. } | Call::Remove { uri } => uri,
        }
    }
}

/// Indexer that remembers every call, optionally failing or panicking.
pub struct RecordingIndexer {
    name: String,
    indexer_type: IndexerType,
    behaviour: Behaviour,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

impl RecordingIndexer {
    pub fn new(name: &str, indexer_type: IndexerType) -> Arc<Self> {
        Self::with_behaviour(name, indexer_type, Behaviour::Succeed)
    }

    pub fn with_behaviour(name: &str, indexer_type: IndexerType, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            indexer_type,
            behaviour,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updated_uris(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .map(|c| c.uri().to_string())
            .collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err(Error::Indexer(format!("{} is down", self.name))),
            Behaviour::Panic => panic!("{} blew up", self.name),
        }
    }
}

impl Indexer for RecordingIndexer {
    fn name(&self) -> &str {
        &self.name
    }

    fn indexer_type(&self) -> IndexerType {
        self.indexer_type
    }

    fn update(&self, uri: &str, content: IndexContent<'_>) -> Result<()> {
        let (triples, fields) = match content {
            IndexContent::Rdf(graph) => (graph.len(), Vec::new()),
            IndexContent::NamedFields(fields) => (
                0,
                fields.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect(),
            ),
            IndexContent::None => (0, Vec::new()),
        };
        self.record(Call::Update { uri: uri.to_string(), triples, fields })
    }

    fn remove(&self, uri: &str) -> Result<()> {
        self.record(Call::Remove { uri: uri.to_string() })
    }
}

/// Turtle for `uri` with the given extra statements about it.
pub fn resource(uri: &str, statements: &[&str]) -> String {
    let mut body = PREFIXES.to_string();
    for statement in statements {
        body.push_str(&format!("<{}> {} .\n", uri, statement));
    }
    body
}

pub fn group_of(repository: &Arc<MemoryRepository>, indexers: &[Arc<RecordingIndexer>]) -> IndexerGroup {
    let indexers = indexers.iter().map(|i| Arc::clone(i) as Arc<dyn Indexer>).collect();
    let repository: Arc<dyn Repository> = repository.clone();
    IndexerGroup::with_repository(ROOT, indexers, repository).unwrap()
}
