//! In-memory repository, for tests, benchmarks and dry runs.

use super::repository::{Repository, RepositoryResponse};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryRepository {
    resources: RwLock<HashMap<String, RepositoryResponse>>,
    requests: RwLock<HashMap<String, usize>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` as Turtle for `uri`.
    pub fn insert_turtle(&self, uri: &str, body: &str) {
        self.insert(uri, RepositoryResponse::new(Some("text/turtle"), body));
    }

    pub fn insert(&self, uri: &str, response: RepositoryResponse) {
        if let Ok(mut resources) = self.resources.write() {
            resources.insert(uri.to_string(), response);
        }
    }

    pub fn remove(&self, uri: &str) {
        if let Ok(mut resources) = self.resources.write() {
            resources.remove(uri);
        }
    }

    /// Number of GETs issued for `uri` so far.
    pub fn request_count(&self, uri: &str) -> usize {
        self.requests.read().map(|r| r.get(uri).copied().unwrap_or(0)).unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.requests.read().map(|r| r.values().sum()).unwrap_or(0)
    }
}

impl Repository for MemoryRepository {
    fn get(&self, uri: &str, _accept: &str) -> Result<RepositoryResponse> {
        if let Ok(mut requests) = self.requests.write() {
            *requests.entry(uri.to_string()).or_insert(0) += 1;
        }

        let resources =
            self.resources.read().map_err(|_| Error::retrieval(uri, "repository lock poisoned"))?;
        resources
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::retrieval(uri, "repository answered with status 404 Not Found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_requests_including_misses() {
        let repo = MemoryRepository::new();
        repo.insert_turtle("http://r/a", "");

        assert!(repo.get("http://r/a", "text/turtle").is_ok());
        assert!(repo.get("http://r/missing", "text/turtle").is_err());
        assert_eq!(repo.request_count("http://r/a"), 1);
        assert_eq!(repo.request_count("http://r/missing"), 1);
        assert_eq!(repo.total_requests(), 2);
    }
}
