use std::fs;

use sheetgraph::cache::{fingerprint_tables, CacheStore, ContentCache, FileStore, MemoryStore};
use sheetgraph::export::{to_json, to_yaml, ExportBundle};
use sheetgraph::graph::{relation, Graph, Link, Node, NodeType};
use sheetgraph::table::Table;

fn create_test_tables() -> Vec<Table> {
    vec![Table::from_values(
        "Budget",
        vec![
            vec![Some("Dept".into()), Some("Cost".into())],
            vec![Some("Marketing".into()), Some(100.0.into())],
            vec![Some("R&D".into()), None],
        ],
    )]
}

fn create_test_graph() -> Graph {
    Graph::new(
        vec![
            Node::new("sheet", NodeType::Sheet, "Budget"),
            Node::new("b2", NodeType::Cell, "Cost").with_address("B2"),
        ],
        vec![Link::new("l1", "sheet", "b2", relation::CONTAINS)],
    )
}

#[test]
fn test_file_cache_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let tables = create_test_tables();
    let fp = fingerprint_tables(&tables).unwrap();

    let mut cache = ContentCache::new(FileStore::new(dir.path()));
    cache.put(&fp, &create_test_graph(), &tables).unwrap();
    assert!(dir.path().join(format!("{}.json", fp)).exists());

    let mut reopened = ContentCache::new(FileStore::new(dir.path()));
    let entry = reopened.get(&fp).unwrap();
    assert_eq!(entry.graph, create_test_graph());
    assert_eq!(entry.tables, tables);
}

#[test]
fn test_truncated_file_is_purged() {
    let dir = tempfile::tempdir().unwrap();
    let tables = create_test_tables();
    let fp = fingerprint_tables(&tables).unwrap();
    let path = dir.path().join(format!("{}.json", fp));

    let mut cache = ContentCache::new(FileStore::new(dir.path()));
    cache.put(&fp, &create_test_graph(), &tables).unwrap();
    let full = fs::read_to_string(&path).unwrap();
    fs::write(&path, &full[..full.len() / 2]).unwrap();

    assert!(cache.get(&fp).is_none());
    assert!(!path.exists());
    assert!(cache.store().keys().unwrap().is_empty());
}

#[test]
fn test_reparsed_tables_hit_same_entry() {
    let tables = create_test_tables();
    let json = serde_json::to_string(&tables).unwrap();
    let reparsed: Vec<Table> = serde_json::from_str(&json).unwrap();

    let mut cache = ContentCache::new(MemoryStore::new());
    cache
        .put(&fingerprint_tables(&tables).unwrap(), &create_test_graph(), &tables)
        .unwrap();
    assert!(cache.get(&fingerprint_tables(&reparsed).unwrap()).is_some());
}

#[test]
fn test_write_failure_does_not_poison_cache() {
    let tables = create_test_tables();
    let fp = fingerprint_tables(&tables).unwrap();
    let mut cache = ContentCache::new(MemoryStore::with_quota(64));

    let err = cache.put(&fp, &create_test_graph(), &tables).unwrap_err();
    assert!(err.is_write_failure());
    assert_eq!(err.error_code(), "QUOTA_EXCEEDED");
    assert!(cache.get(&fp).is_none());
}

#[test]
fn test_cache_entry_exports_both_formats() {
    let tables = create_test_tables();
    let fp = fingerprint_tables(&tables).unwrap();
    let mut cache = ContentCache::new(MemoryStore::new());
    let entry = cache.put(&fp, &create_test_graph(), &tables).unwrap();

    let bundle = ExportBundle::from(entry);
    let from_json = to_json::parse(&to_json::render(&bundle).unwrap()).unwrap();
    let from_yaml = to_yaml::parse(&to_yaml::render(&bundle).unwrap()).unwrap();
    assert_eq!(from_json, bundle);
    assert_eq!(from_yaml, bundle);
}

#[test]
fn test_non_utf8_file_is_purged() {
    let dir = tempfile::tempdir().unwrap();
    let fp = fingerprint_tables(&create_test_tables()).unwrap();
    let path = dir.path().join(format!("{}.json", fp));
    fs::write(&path, b"{\xff\xfe\"").unwrap();

    let mut cache = ContentCache::new(FileStore::new(dir.path()));
    assert!(cache.get(&fp).is_none());
    assert!(!path.exists());
    assert!(cache.store().keys().unwrap().is_empty());
}

#[test]
fn test_cached_graph_with_dangling_link_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let tables = create_test_tables();
    let fp = fingerprint_tables(&tables).unwrap();
    let mut graph = create_test_graph();
    graph
        .links
        .push(Link::new("l2", "b2", "ghost", relation::REFERENCES));

    let mut cache = ContentCache::new(FileStore::new(dir.path()));
    cache.put(&fp, &graph, &tables).unwrap();
    assert!(cache.get(&fp).is_none());
    assert!(cache.store().keys().unwrap().is_empty());
}
