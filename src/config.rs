//! Configuration file for the indexer.
//!
//! ```toml
//! repository_url = "http://localhost:8080/rest/"
//!
//! [credentials]
//! username = "fedoraAdmin"
//! password = "secret"
//!
//! [source]
//! kind = "mqtt"
//! host = "localhost"
//! topics = ["fedora"]
//!
//! [[indexers]]
//! kind = "sparql"
//! endpoint = "http://localhost:7878"
//!
//! [[indexers]]
//! kind = "file"
//! directory = "data/fields"
//! format = "named_fields"
//! ```

use crate::error::{Error, Result};
use crate::fetching::Credentials;
use crate::indexing::{FileFormat, FileSerializer, Indexer, SparqlUpdateIndexer, StoreProtocol};
#[cfg(not(windows))]
use crate::sources::KafkaSourceConfig;
use crate::sources::MqttSourceConfig;
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct IndexerConfig {
    pub repository_url: String,
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub indexers: Vec<IndexerSpec>,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Where repository events come from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Mqtt {
        #[serde(flatten)]
        connection: MqttSourceConfig,
        #[serde(default = "default_topics")]
        topics: Vec<String>,
    },
    #[cfg(not(windows))]
    Kafka {
        #[serde(flatten)]
        connection: KafkaSourceConfig,
        #[serde(default = "default_topics")]
        topics: Vec<String>,
    },
    #[default]
    None,
}

impl SourceConfig {
    pub fn topics(&self) -> &[String] {
        match self {
            SourceConfig::Mqtt { topics, .. } => topics,
            #[cfg(not(windows))]
            SourceConfig::Kafka { topics, .. } => topics,
            SourceConfig::None => &[],
        }
    }
}

fn default_topics() -> Vec<String> {
    vec!["fedora".to_string()]
}

/// One downstream index.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndexerSpec {
    Sparql {
        endpoint: String,
        #[serde(default)]
        store_type: StoreProtocol,
        #[serde(default)]
        auth_token: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    File {
        directory: PathBuf,
        #[serde(default)]
        format: FileFormat,
    },
}

fn default_timeout_secs() -> u64 {
    30
}

impl IndexerSpec {
    pub fn build(&self) -> Result<Arc<dyn Indexer>> {
        let indexer: Arc<dyn Indexer> = match self {
            IndexerSpec::Sparql { endpoint, store_type, auth_token, timeout_secs } => Arc::new(
                SparqlUpdateIndexer::new(endpoint, *store_type, *timeout_secs)?
                    .with_auth_token(auth_token.clone()),
            ),
            IndexerSpec::File { directory, format } => {
                Arc::new(FileSerializer::new(directory.clone(), *format)?)
            }
        };
        Ok(indexer)
    }
}

/// Control server address
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8090 }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl IndexerConfig {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: IndexerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.repository_url).map_err(|e| {
            Error::Config(format!("invalid repository_url {}: {}", self.repository_url, e))
        })?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(Error::Config(format!(
                "repository_url must be an absolute URL: {}",
                self.repository_url
            )));
        }
        if self.indexers.is_empty() {
            return Err(Error::Config("at least one [[indexers]] entry is required".to_string()));
        }
        Ok(())
    }

    /// Credentials, unless either part is missing or blank.
    pub fn credentials(&self) -> Option<Credentials> {
        let creds = self.credentials.as_ref()?;
        Credentials::from_parts(creds.username.as_deref(), creds.password.as_deref())
    }

    pub fn build_indexers(&self) -> Result<Vec<Arc<dyn Indexer>>> {
        self.indexers.iter().map(IndexerSpec::build).collect()
    }
}
