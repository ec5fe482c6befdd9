//! Flat string-keyed storage backing the content cache.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{CacheError, CacheResult};

pub trait CacheStore {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> CacheResult<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> CacheResult<()>;
    fn keys(&self) -> CacheResult<Vec<String>>;
}

/// In-process store. An optional byte quota makes writes fail the way a full
/// browser profile would.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> CacheResult<()> {
        if let Some(quota) = self.quota_bytes {
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(self.used_bytes_excluding(key));
            if needed > available {
                return Err(CacheError::QuotaExceeded { needed, available });
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// One `<key>.json` file per entry under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CacheResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CacheError::InvalidFingerprint(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| CacheError::CorruptEntry {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn set(&mut self, key: &str, value: String) -> CacheResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // write-then-rename so readers never see a half-written entry
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, value).and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!("Wrote cache file {:?}", path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CacheResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Store chosen from configuration: on disk when a cache directory is set,
/// in memory otherwise.
#[derive(Debug, Clone)]
pub enum ConfiguredStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl ConfiguredStore {
    pub fn new(cache_dir: Option<&Path>) -> Self {
        match cache_dir {
            Some(dir) => ConfiguredStore::File(FileStore::new(dir)),
            None => ConfiguredStore::Memory(MemoryStore::new()),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, ConfiguredStore::File(_))
    }
}

impl CacheStore for ConfiguredStore {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self {
            ConfiguredStore::Memory(store) => store.get(key),
            ConfiguredStore::File(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: String) -> CacheResult<()> {
        match self {
            ConfiguredStore::Memory(store) => store.set(key, value),
            ConfiguredStore::File(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> CacheResult<()> {
        match self {
            ConfiguredStore::Memory(store) => store.remove(key),
            ConfiguredStore::File(store) => store.remove(key),
        }
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        match self {
            ConfiguredStore::Memory(store) => store.keys(),
            ConfiguredStore::File(store) => store.keys(),
        }
    }
}
