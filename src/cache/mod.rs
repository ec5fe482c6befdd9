//! Content-addressed cache of analysis results.
//!
//! Entries are keyed by the fingerprint of the input tables, so the same
//! upload parsed twice hits the cache regardless of object identity or key
//! order. Entries are replaced wholesale, never patched.

mod fingerprint;
mod store;

pub use fingerprint::{canonical_json, fingerprint_tables, fingerprint_value, Fingerprint};
pub use store::{CacheStore, ConfiguredStore, FileStore, MemoryStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::CacheResult;
use crate::graph::Graph;
use crate::table::Table;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub generated_at: DateTime<Utc>,
    pub graph: Graph,
    pub tables: Vec<Table>,
}

pub struct ContentCache<S: CacheStore> {
    store: S,
}

impl<S: CacheStore> ContentCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Look up an entry. Entries that are unreadable, unparsable, stored under
    /// the wrong key, or hold a graph with dangling links or duplicate ids are
    /// purged and reported as a miss.
    pub fn get(&mut self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let raw = match self.store.get(fingerprint.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(%fingerprint, "Cache miss");
                return None;
            }
            Err(e) if e.is_corrupt_entry() => {
                warn!(%fingerprint, "Unreadable cache entry, purging: {}", e);
                self.purge(fingerprint);
                return None;
            }
            Err(e) => {
                warn!(%fingerprint, "Cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if entry.fingerprint != *fingerprint => {
                warn!(%fingerprint, "Cache entry stored under the wrong key, purging");
                self.purge(fingerprint);
                None
            }
            Ok(entry) => match entry.graph.validate() {
                Ok(()) => {
                    debug!(%fingerprint, "Cache hit");
                    Some(entry)
                }
                Err(e) => {
                    warn!(%fingerprint, "Cached graph fails integrity check, purging: {}", e);
                    self.purge(fingerprint);
                    None
                }
            },
            Err(e) => {
                warn!(%fingerprint, "Corrupt cache entry, purging: {}", e);
                self.purge(fingerprint);
                None
            }
        }
    }

    /// Store a fresh entry, overwriting whatever was under the key.
    pub fn put(
        &mut self,
        fingerprint: &Fingerprint,
        graph: &Graph,
        tables: &[Table],
    ) -> CacheResult<CacheEntry> {
        let entry = CacheEntry {
            fingerprint: fingerprint.clone(),
            generated_at: Utc::now(),
            graph: graph.clone(),
            tables: tables.to_vec(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(fingerprint.as_str(), raw)?;
        debug!(%fingerprint, "Cached analysis result ({})", graph.stats());
        Ok(entry)
    }

    pub fn remove(&mut self, fingerprint: &Fingerprint) -> CacheResult<()> {
        self.store.remove(fingerprint.as_str())
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&mut self) -> CacheResult<usize> {
        let keys = self.store.keys()?;
        for key in &keys {
            self.store.remove(key)?;
        }
        info!("Cleared {} cache entries", keys.len());
        Ok(keys.len())
    }

    fn purge(&mut self, fingerprint: &Fingerprint) {
        if let Err(e) = self.store.remove(fingerprint.as_str()) {
            warn!(%fingerprint, "Failed to purge cache entry: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CacheError;
    use crate::graph::{relation, Link, Node, NodeType};

    fn create_test_tables() -> Vec<Table> {
        vec![Table::from_values(
            "Sheet1",
            vec![vec![Some("A".into())], vec![Some(1.0.into())]],
        )]
    }

    fn create_test_graph() -> Graph {
        Graph::new(vec![Node::new("s", NodeType::Sheet, "Sheet1")], Vec::new())
    }

    #[test]
    fn test_put_then_get() {
        let tables = create_test_tables();
        let fp = fingerprint_tables(&tables).unwrap();
        let mut cache = ContentCache::new(MemoryStore::new());

        assert!(cache.get(&fp).is_none());
        let stored = cache.put(&fp, &create_test_graph(), &tables).unwrap();
        let loaded = cache.get(&fp).unwrap();
        assert_eq!(loaded, stored);
        assert_eq!(loaded.graph, create_test_graph());
    }

    #[test]
    fn test_put_overwrites() {
        let tables = create_test_tables();
        let fp = fingerprint_tables(&tables).unwrap();
        let mut cache = ContentCache::new(MemoryStore::new());
        cache.put(&fp, &Graph::default(), &tables).unwrap();
        cache.put(&fp, &create_test_graph(), &tables).unwrap();
        assert_eq!(cache.get(&fp).unwrap().graph, create_test_graph());
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_corrupt_entry_is_purged() {
        let fp = fingerprint_tables(&create_test_tables()).unwrap();
        let mut store = MemoryStore::new();
        store.set(fp.as_str(), "{\"fingerprint\": \"trunc".to_string()).unwrap();
        let mut cache = ContentCache::new(store);

        assert!(cache.get(&fp).is_none());
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_mismatched_entry_is_purged() {
        let tables = create_test_tables();
        let fp = fingerprint_tables(&tables).unwrap();
        let other = fingerprint_tables(&[]).unwrap();
        let mut cache = ContentCache::new(MemoryStore::new());
        let entry = cache.put(&other, &create_test_graph(), &[]).unwrap();

        let raw = serde_json::to_string(&entry).unwrap();
        cache.store_mut().set(fp.as_str(), raw).unwrap();
        assert!(cache.get(&fp).is_none());
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_entry_with_dangling_link_is_purged() {
        let tables = create_test_tables();
        let fp = fingerprint_tables(&tables).unwrap();
        let mut graph = create_test_graph();
        graph.links.push(Link::new("l", "s", "ghost", relation::CONTAINS));

        let mut cache = ContentCache::new(MemoryStore::new());
        cache.put(&fp, &graph, &tables).unwrap();
        assert!(cache.get(&fp).is_none());
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_quota_failure_is_reported() {
        let tables = create_test_tables();
        let fp = fingerprint_tables(&tables).unwrap();
        let mut cache = ContentCache::new(MemoryStore::with_quota(16));
        let err = cache.put(&fp, &create_test_graph(), &tables).unwrap_err();
        assert!(matches!(err, CacheError::QuotaExceeded { .. }));
        assert!(cache.get(&fp).is_none());
    }

    #[test]
    fn test_clear() {
        let mut cache = ContentCache::new(MemoryStore::new());
        let a = fingerprint_tables(&create_test_tables()).unwrap();
        let b = fingerprint_tables(&[]).unwrap();
        cache.put(&a, &Graph::default(), &[]).unwrap();
        cache.put(&b, &Graph::default(), &[]).unwrap();
        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.store().is_empty());
    }
}
