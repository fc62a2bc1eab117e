//! Depth-first reindex traversal over `hasChild`.

use super::dispatcher::IndexerGroup;
use crate::core::vocab::HAS_CHILD;
use crate::core::REINDEX_EVENT_TYPE;
use crate::fetching::{iri_objects, Memoized, ResourceFetcher};
use serde::Serialize;
use std::collections::HashSet;

/// Summary of one reindex call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    pub root: String,
    pub recursive: bool,
    /// Nodes submitted to the dispatcher
    pub dispatched: usize,
    /// Nodes whose children could not be listed
    pub skipped_subtrees: usize,
}

/// One traversal. Both sets live exactly as long as the traversal.
pub struct Reindexer<'g> {
    group: &'g IndexerGroup,
    /// Nodes whose children were listed
    reindexed: HashSet<String>,
    /// Nodes dispatched, including datastream parents cascaded to
    dispatched: HashSet<String>,
    report: ReindexReport,
}

impl<'g> Reindexer<'g> {
    pub fn new(group: &'g IndexerGroup) -> Self {
        Self {
            group,
            reindexed: HashSet::new(),
            dispatched: HashSet::new(),
            report: ReindexReport::default(),
        }
    }

    pub fn run(mut self, uri: &str, recursive: bool) -> ReindexReport {
        tracing::info!(uri, recursive, "Starting reindex");
        self.report.root = uri.to_string();
        self.report.recursive = recursive;

        self.reindex_uri(uri, recursive);

        tracing::info!(
            uri,
            dispatched = self.report.dispatched,
            skipped_subtrees = self.report.skipped_subtrees,
            "Reindex finished"
        );
        self.report
    }

    fn reindex_uri(&mut self, uri: &str, recursive: bool) {
        tracing::debug!(uri, recursive, "Reindexing");
        if self.dispatched.insert(uri.to_string()) {
            // dispatch checks the indexable type itself
            let group = self.group;
            group.dispatch_with(uri, Some(REINDEX_EVENT_TYPE), &mut self.dispatched);
            self.report.dispatched += 1;
        }

        // prevent infinite recursion
        self.reindexed.insert(uri.to_string());

        if !recursive {
            return;
        }

        let group = self.group;
        let repository = group.repository();
        let rdf = Memoized::new(|| ResourceFetcher::new(uri, repository).fetch());
        let children = match rdf.get() {
            Ok(model) => iri_objects(model, uri, HAS_CHILD),
            Err(e) => {
                tracing::error!(uri, error = %e, "Unable to list children, skipping subtree");
                self.report.skipped_subtrees += 1;
                return;
            }
        };

        for child in children {
            if !self.reindexed.contains(&child) {
                self.reindex_uri(&child, true);
            }
        }
    }
}
