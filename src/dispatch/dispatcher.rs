use super::reindexer::{ReindexReport, Reindexer};
use crate::core::vocab::{DATASTREAM, INDEXABLE};
use crate::core::{EventKind, InboundMessage, RepositoryEvent, PARENT_UPDATE_EVENT_TYPE};
use crate::error::{Error, Result};
use crate::fetching::{
    asserts_type, Credentials, HttpRepository, Memoized, NamedFieldsFetcher, Repository,
    ResourceFetcher,
};
use crate::indexing::{IndexContent, Indexer, IndexerType};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Datastreams below this path never cascade to their parent.
const SYSTEM_PATH: &str = "/fedora:system/";

/// What a single dispatch did, per indexer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub updated: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Parent dispatched because the resource is a datastream
    pub parent: Option<String>,
}

/// Receives repository events and fans each one out to every registered indexer.
///
/// The group is shared by every thread the transport delivers events on. Each
/// dispatch builds its own memoized RDF and named-fields suppliers, so a
/// resource is fetched at most once per dispatch no matter how many indexers
/// consume it.
pub struct IndexerGroup {
    repository_url: String,
    indexers: Vec<Arc<dyn Indexer>>,
    repository: Arc<dyn Repository>,
}

impl IndexerGroup {
    /// Group backed by the repository's HTTP interface.
    pub fn new(
        repository_url: &str,
        indexers: Vec<Arc<dyn Indexer>>,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let repository = HttpRepository::new(repository_url, credentials)?;
        Self::with_repository(repository_url, indexers, Arc::new(repository))
    }

    pub fn with_repository(
        repository_url: &str,
        indexers: Vec<Arc<dyn Indexer>>,
        repository: Arc<dyn Repository>,
    ) -> Result<Self> {
        if indexers.is_empty() {
            return Err(Error::Config("an indexer group needs at least one indexer".to_string()));
        }
        tracing::debug!(
            repository_url,
            indexers = ?indexers.iter().map(|i| i.name().to_string()).collect::<Vec<_>>(),
            "Creating IndexerGroup"
        );
        Ok(Self { repository_url: repository_url.to_string(), indexers, repository })
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }

    pub fn indexers(&self) -> &[Arc<dyn Indexer>] {
        &self.indexers
    }

    /// Decode a transport message and handle it.
    ///
    /// Only an undecodable message is an error, so the transport can decide
    /// about redelivery; everything after decoding is handled and logged here.
    pub fn on_message(&self, message: &InboundMessage) -> Result<()> {
        let event = RepositoryEvent::decode(message).map_err(|e| {
            tracing::error!(error = %e, "Received unintelligible message");
            e
        })?;
        self.on_event(&event);
        Ok(())
    }

    /// Handle one repository event. Events lacking an identifier or base URL
    /// are logged and dropped.
    pub fn on_event(&self, event: &RepositoryEvent) {
        tracing::debug!(
            identifier = ?event.identifier(),
            event_type = ?event.event_type(),
            base_url = ?event.base_url(),
            properties = ?event.properties(),
            "Received event"
        );

        match event.resource_uri() {
            Some(uri) => {
                self.dispatch(&uri, event.event_type());
            }
            None => tracing::warn!(?event, "Dropping event without identifier or baseURL"),
        }
    }

    /// Translate one change of `uri` into indexer calls.
    pub fn dispatch(&self, uri: &str, event_type: Option<&str>) -> DispatchOutcome {
        let mut dispatched = HashSet::from([uri.to_string()]);
        self.dispatch_with(uri, event_type, &mut dispatched)
    }

    /// [`dispatch`](Self::dispatch) within a larger unit of work. A datastream
    /// parent already in `dispatched` is skipped, a parent dispatched here is
    /// added to it.
    pub(crate) fn dispatch_with(
        &self,
        uri: &str,
        event_type: Option<&str>,
        dispatched: &mut HashSet<String>,
    ) -> DispatchOutcome {
        let removal = EventKind::from_event_type(event_type).is_removal();
        tracing::debug!(uri, removal, "Dispatching");

        let repository = self.repository.as_ref();
        let rdf = Memoized::new(|| ResourceFetcher::new(uri, repository).fetch());
        let read_rdf = || rdf.get();
        let named_fields =
            Memoized::new(|| NamedFieldsFetcher::new(uri, repository, &read_rdf).fetch());

        let mut outcome = DispatchOutcome::default();
        let mut indexable = false;

        if !removal {
            match rdf.get() {
                Ok(model) => {
                    indexable = asserts_type(model, uri, INDEXABLE);
                    tracing::debug!(uri, indexable, "Resource retrieved");

                    if asserts_type(model, uri, DATASTREAM) && !uri.contains(SYSTEM_PATH) {
                        outcome.parent = self.dispatch_parent(uri, dispatched);
                    }
                }
                Err(e) => {
                    tracing::error!(uri, error = %e, "Unable to retrieve resource, not indexing it");
                }
            }
        }

        for indexer in &self.indexers {
            let name = indexer.name();

            if removal {
                tracing::debug!(uri, indexer = name, "Executing removal");
                match guarded(|| indexer.remove(uri)) {
                    Ok(()) => outcome.removed += 1,
                    Err(e) => {
                        tracing::error!(uri, indexer = name, error = %e, "Error removing from index");
                        outcome.failed += 1;
                    }
                }
                continue;
            }

            if !indexable {
                outcome.skipped += 1;
                continue;
            }

            let content = match indexer.indexer_type() {
                IndexerType::Rdf => {
                    tracing::debug!(uri, indexer = name, "Retrieving RDF (may be cached)");
                    rdf.get().map(IndexContent::Rdf)
                }
                IndexerType::NamedFields => {
                    tracing::debug!(uri, indexer = name, "Retrieving named fields (may be cached)");
                    named_fields.get().map(IndexContent::NamedFields)
                }
                IndexerType::Other => Ok(IndexContent::None),
            };

            let content = match content {
                Ok(content) => content,
                Err(e) if e.is_absent_transform() => {
                    tracing::error!(
                        uri,
                        indexer = name,
                        "Failed to retrieve indexable content: could not find transform property"
                    );
                    outcome.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(uri, indexer = name, error = %e, "Unable to retrieve content for update");
                    outcome.skipped += 1;
                    continue;
                }
            };

            tracing::debug!(uri, indexer = name, "Executing update");
            match guarded(|| indexer.update(uri, content)) {
                Ok(()) => outcome.updated += 1,
                Err(e) => {
                    tracing::error!(uri, indexer = name, error = %e, "Error indexing");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    fn dispatch_parent(&self, uri: &str, dispatched: &mut HashSet<String>) -> Option<String> {
        match parent_of(uri) {
            Some(parent) if dispatched.contains(parent) => {
                tracing::debug!(uri, parent, "Datastream parent already dispatched");
                None
            }
            Some(parent) => {
                tracing::info!(uri, parent, "Datastream found, also indexing parent");
                dispatched.insert(parent.to_string());
                self.dispatch_with(parent, Some(PARENT_UPDATE_EVENT_TYPE), dispatched);
                Some(parent.to_string())
            }
            None => {
                tracing::warn!(uri, "Datastream URI has no parent segment");
                None
            }
        }
    }

    /// Reindex the whole repository, starting at its root.
    pub fn reindex_all(&self) -> ReindexReport {
        self.reindex(&self.repository_url, true)
    }

    /// Reindex `uri`, and with `recursive` everything reachable from it
    /// through `hasChild`. Each call keeps its own visited set.
    pub fn reindex(&self, uri: &str, recursive: bool) -> ReindexReport {
        Reindexer::new(self).run(uri, recursive)
    }
}

/// `uri` without its final `/segment`.
pub fn parent_of(uri: &str) -> Option<&str> {
    uri.rfind('/').map(|idx| &uri[..idx])
}

/// Run an indexer call, turning a panic into an indexer error.
fn guarded(call: impl FnOnce() -> Result<()>) -> Result<()> {
    catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| Err(Error::Indexer(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("indexer panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("indexer panicked: {}", msg)
    } else {
        "indexer panicked".to_string()
    }
}
