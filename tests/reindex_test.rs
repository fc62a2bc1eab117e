mod common;

use common::{group_of, resource, RecordingIndexer, ROOT};
use fedora_indexer::fetching::MemoryRepository;
use fedora_indexer::IndexerType;
use std::collections::HashSet;
use std::sync::Arc;

/// root -> a, b; a -> root, b; b -> a
fn cyclic_tree() -> Arc<MemoryRepository> {
    let repository = Arc::new(MemoryRepository::new());
    repository.insert_turtle(
        ROOT,
        &resource(ROOT, &["rdf:type indexing:indexable", "repo:hasChild <http://r/a>", "repo:hasChild <http://r/b>"]),
    );
    repository.insert_turtle(
        "http://r/a",
        &resource(
            "http://r/a",
            &["rdf:type indexing:indexable", "repo:hasChild <http://r/>", "repo:hasChild <http://r/b>"],
        ),
    );
    repository.insert_turtle(
        "http://r/b",
        &resource("http://r/b", &["rdf:type indexing:indexable", "repo:hasChild <http://r/a>"]),
    );
    repository
}

#[test]
fn test_recursive_reindex_visits_each_node_once() {
    let repository = cyclic_tree();
    let rdf = RecordingIndexer::new("rdf", IndexerType::Rdf);
    let group = group_of(&repository, &[rdf.clone()]);

    let report = group.reindex_all();

    let updated = rdf.updated_uris();
    let unique: HashSet<_> = updated.iter().cloned().collect();
    assert_eq!(updated.len(), 3);
    assert_eq!(unique.len(), 3);
    assert_eq!(report.root, ROOT);
    assert!(report.recursive);
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.skipped_subtrees, 0);
}

#[test]
fn test_non_recursive_reindex_only_dispatches_root() {
    let repository = cyclic_tree();
    let rdf = RecordingIndexer::new("rdf", IndexerType::Rdf);
    let group = group_of(&repository, &[rdf.clone()]);

    let report = group.reindex("http://r/a", false);

    assert_eq!(rdf.updated_uris(), vec!["http://r/a".to_string()]);
    assert_eq!(report.dispatched, 1);
    assert_eq!(repository.request_count("http://r/b"), 0);
}

#[test]
fn test_repeated_reindex_calls_start_fresh() {
    let repository = cyclic_tree();
    let rdf = RecordingIndexer::new("rdf", IndexerType::Rdf);
    let group = group_of(&repository, &[rdf.clone()]);

    group.reindex("http://r/b", true);
    group.reindex("http://r/b", true);

    assert_eq!(rdf.updated_uris().len(), 6);
}

#[test]
fn test_missing_child_skips_only_its_subtree() {
    let repository = Arc::new(MemoryRepository::new());
    repository.insert_turtle(
        ROOT,
        &resource(ROOT, &["repo:hasChild <http://r/gone>", "repo:hasChild <http://r/c>"]),
    );
    repository.insert_turtle("http://r/c", &resource("http://r/c", &["rdf:type indexing:indexable"]));
    let rdf = RecordingIndexer::new("rdf", IndexerType::Rdf);
    let group = group_of(&repository, &[rdf.clone()]);

    let report = group.reindex_all();

    // the root is not indexable, the missing child cannot be read
    assert_eq!(rdf.updated_uris(), vec!["http://r/c".to_string()]);
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.skipped_subtrees, 1);
}

#[test]
fn test_literal_children_are_ignored() {
    let repository = Arc::new(MemoryRepository::new());
    repository.insert_turtle(ROOT, &resource(ROOT, &["rdf:type indexing:indexable", "repo:hasChild \"http://r/x\""]));
    let rdf = RecordingIndexer::new("rdf", IndexerType::Rdf);
    let group = group_of(&repository, &[rdf.clone()]);

    let report = group.reindex_all();

    assert_eq!(report.dispatched, 1);
    assert_eq!(repository.request_count("http://r/x"), 0);
}

#[test]
fn test_datastream_parent_dispatched_once_per_reindex() {
    let repository = Arc::new(MemoryRepository::new());
    repository.insert_turtle(ROOT, &resource(ROOT, &["rdf:type indexing:indexable", "repo:hasChild <http://r/obj>"]));
    repository.insert_turtle(
        "http://r/obj",
        &resource("http://r/obj", &["rdf:type indexing:indexable", "repo:hasChild <http://r/obj/ds1>"]),
    );
    repository.insert_turtle(
        "http://r/obj/ds1",
        &resource("http://r/obj/ds1", &["rdf:type indexing:indexable", "rdf:type restapi:datastream"]),
    );
    let rdf = RecordingIndexer::new("rdf", IndexerType::Rdf);
    let group = group_of(&repository, &[rdf.clone()]);

    let report = group.reindex_all();

    let updated = rdf.updated_uris();
    assert_eq!(updated.iter().filter(|uri| *uri == "http://r/obj").count(), 1);
    assert_eq!(updated.len(), 3);
    assert_eq!(report.dispatched, 3);
}

#[test]
fn test_cascaded_parent_still_has_its_children_reindexed() {
    let repository = Arc::new(MemoryRepository::new());
    repository.insert_turtle(
        ROOT,
        &resource(ROOT, &["repo:hasChild <http://r/obj/ds1>", "repo:hasChild <http://r/obj>"]),
    );
    repository.insert_turtle(
        "http://r/obj",
        &resource("http://r/obj", &["rdf:type indexing:indexable", "repo:hasChild <http://r/obj/other>"]),
    );
    repository.insert_turtle(
        "http://r/obj/ds1",
        &resource("http://r/obj/ds1", &["rdf:type indexing:indexable", "rdf:type restapi:datastream"]),
    );
    repository.insert_turtle("http://r/obj/other", &resource("http://r/obj/other", &["rdf:type indexing:indexable"]));
    let rdf = RecordingIndexer::new("rdf", IndexerType::Rdf);
    let group = group_of(&repository, &[rdf.clone()]);

    group.reindex_all();

    let mut updated = rdf.updated_uris();
    updated.sort();
    assert_eq!(
        updated,
        vec!["http://r/obj".to_string(), "http://r/obj/ds1".to_string(), "http://r/obj/other".to_string()]
    );
}
