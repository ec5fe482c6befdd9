use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::analysis::{AnalysisConfig, AnalysisDepth};
use crate::cache::ConfiguredStore;
use crate::history::DEFAULT_CAPACITY;

pub const ENV_HISTORY_CAPACITY: &str = "SHEETGRAPH_HISTORY_CAPACITY";
pub const ENV_CACHE_DIR: &str = "SHEETGRAPH_CACHE_DIR";
pub const ENV_ANALYSIS_DEPTH: &str = "SHEETGRAPH_ANALYSIS_DEPTH";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub history_capacity: usize,
    /// Directory for the on-disk cache; the cache lives in memory when unset.
    pub cache_dir: Option<PathBuf>,
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            cache_dir: None,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a YAML config file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config.with_env_overrides())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut config: AppConfig = serde_yaml::from_str(content)?;
        config.history_capacity = config.history_capacity.max(1);
        Ok(config)
    }

    /// Cache store for this configuration: a `FileStore` under `cache_dir`
    /// when set, a `MemoryStore` otherwise.
    pub fn cache_store(&self) -> ConfiguredStore {
        ConfiguredStore::new(self.cache_dir.as_deref())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    /// Apply overrides from `lookup`. Unparsable values are logged and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_HISTORY_CAPACITY) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => self.history_capacity = capacity.max(1),
                Err(_) => warn!("Ignoring invalid {}: {}", ENV_HISTORY_CAPACITY, raw),
            }
        }

        if let Some(raw) = lookup(ENV_CACHE_DIR) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                warn!("Ignoring empty {}", ENV_CACHE_DIR);
            } else {
                self.cache_dir = Some(PathBuf::from(trimmed));
            }
        }

        if let Some(raw) = lookup(ENV_ANALYSIS_DEPTH) {
            match raw.parse::<AnalysisDepth>() {
                Ok(depth) => self.analysis.depth = depth,
                Err(e) => warn!("Ignoring invalid {}: {}", ENV_ANALYSIS_DEPTH, e),
            }
        }
    }
}
