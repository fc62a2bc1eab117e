//! Event dispatch: the indexer group and the reindex traversal it drives.

pub mod dispatcher;
pub mod reindexer;

pub use dispatcher::{parent_of, DispatchOutcome, IndexerGroup};
pub use reindexer::{ReindexReport, Reindexer};
