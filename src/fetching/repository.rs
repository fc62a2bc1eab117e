//! Access to the repository's HTTP interface.
//!
//! [`Repository`] is the seam the fetchers read through. [`HttpRepository`] is
//! the production implementation: one pooled, blocking `reqwest` client shared
//! by every dispatch for the lifetime of the process.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// A successful repository response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResponse {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RepositoryResponse {
    pub fn new(content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self { content_type: content_type.map(str::to_string), body: body.into() }
    }

    /// Media type without parameters, lowercased.
    pub fn media_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|mt| mt.trim().to_ascii_lowercase())
            .filter(|mt| !mt.is_empty())
    }

    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone())
            .map_err(|e| Error::Transform(format!("response is not UTF-8: {}", e)))
    }
}

/// Read access to repository resources.
pub trait Repository: Send + Sync {
    /// GET `uri` with the given `Accept` header. Non-success statuses are errors.
    fn get(&self, uri: &str, accept: &str) -> Result<RepositoryResponse>;
}

/// HTTP Basic credentials for the repository.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both parts must be non-blank, otherwise no credentials are used.
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.trim().is_empty() && !p.trim().is_empty() => {
                Some(Self { username: u.to_string(), password: p.to_string() })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("username", &self.username).finish_non_exhaustive()
    }
}

/// Host and port a set of credentials applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AuthScope {
    host: String,
    port: Option<u16>,
}

impl AuthScope {
    fn of(url: &Url) -> Option<Self> {
        url.host_str()
            .map(|host| AuthScope { host: host.to_ascii_lowercase(), port: url.port_or_known_default() })
    }
}

/// Blocking HTTP access to the repository.
pub struct HttpRepository {
    client: Client,
    credentials: Option<(AuthScope, Credentials)>,
}

impl HttpRepository {
    /// Build the shared client for `repository_url`. Credentials are only sent
    /// to the repository's own host and port.
    pub fn new(repository_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        let repository = Url::parse(repository_url)
            .map_err(|e| Error::Config(format!("invalid repository URL {}: {}", repository_url, e)))?;

        // reqwest never retries on its own, and the pool has no connection cap
        let client = Client::builder()
            .redirect(Policy::limited(10))
            .pool_max_idle_per_host(usize::MAX)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let credentials = match credentials {
            Some(creds) => {
                tracing::debug!("Adding BASIC credentials to client for repo requests");
                let scope = AuthScope::of(&repository).ok_or_else(|| {
                    Error::Config(format!("repository URL has no host: {}", repository_url))
                })?;
                Some((scope, creds))
            }
            None => None,
        };

        Ok(Self { client, credentials })
    }

    fn credentials_for(&self, url: &Url) -> Option<&Credentials> {
        let (scope, creds) = self.credentials.as_ref()?;
        (AuthScope::of(url).as_ref() == Some(scope)).then_some(creds)
    }
}

impl Repository for HttpRepository {
    fn get(&self, uri: &str, accept: &str) -> Result<RepositoryResponse> {
        let url = Url::parse(uri).map_err(|e| Error::retrieval(uri, format!("invalid URI: {}", e)))?;

        let mut request = self.client.get(url.clone()).header(ACCEPT, accept);
        if let Some(creds) = self.credentials_for(&url) {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().map_err(|e| Error::retrieval(uri, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::retrieval(uri, format!("repository answered with status {}", status)));
        }

        let content_type =
            response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);
        let body = response.bytes().map_err(|e| Error::retrieval(uri, e.to_string()))?;

        Ok(RepositoryResponse { content_type, body: body.to_vec() })
    }
}
