//! Indexer that serializes each resource to a file in a directory.

use super::{unexpected_content, IndexContent, Indexer, IndexerType};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// What a [`FileSerializer`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Named fields as a JSON object, `.json`
    #[default]
    NamedFields,
    /// The RDF model as N-Triples, `.nt`
    Rdf,
}

impl FileFormat {
    fn extension(self) -> &'static str {
        match self {
            FileFormat::NamedFields => "json",
            FileFormat::Rdf => "nt",
        }
    }

    fn indexer_type(self) -> IndexerType {
        match self {
            FileFormat::NamedFields => IndexerType::NamedFields,
            FileFormat::Rdf => IndexerType::Rdf,
        }
    }
}

pub struct FileSerializer {
    name: String,
    directory: PathBuf,
    format: FileFormat,
}

impl FileSerializer {
    /// Create the serializer, creating `directory` if needed.
    pub fn new(directory: impl Into<PathBuf>, format: FileFormat) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;

        Ok(Self { name: format!("file:{}", directory.display()), directory, format })
    }

    /// File holding `uri`. The URI is percent-encoded so distinct URIs never
    /// share a file.
    pub fn path_for(&self, uri: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", urlencoding::encode(uri), self.format.extension()))
    }
}

impl Indexer for FileSerializer {
    fn name(&self) -> &str {
        &self.name
    }

    fn indexer_type(&self) -> IndexerType {
        self.format.indexer_type()
    }

    fn update(&self, uri: &str, content: IndexContent<'_>) -> Result<()> {
        let body = match (self.format, content) {
            (FileFormat::NamedFields, IndexContent::NamedFields(fields)) => {
                serde_json::to_string_pretty(fields).map_err(|e| Error::Indexer(e.to_string()))?
            }
            (FileFormat::Rdf, IndexContent::Rdf(graph)) => {
                let mut out = String::new();
                for triple in graph.iter() {
                    let _ = writeln!(out, "{} .", triple);
                }
                out
            }
            (format, other) => return Err(unexpected_content(&self.name, format.indexer_type(), &other)),
        };

        let path = self.path_for(uri);
        tracing::debug!(uri = %uri, path = %path.display(), "Serializing resource");
        fs::write(&path, body)?;
        Ok(())
    }

    fn remove(&self, uri: &str) -> Result<()> {
        let path = self.path_for(uri);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
