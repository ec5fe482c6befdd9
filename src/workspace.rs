//! Single-owner session state: current tables, graph history, result cache
//! and the analysis boundary.
//!
//! Every method takes `&mut self`, so writes to the history and the cache are
//! serialized by ownership.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisConfig, AnalysisEngine, AnalysisSession, ProgressLine};
use crate::cache::{fingerprint_tables, CacheStore, ConfiguredStore, ContentCache, Fingerprint};
use crate::config::AppConfig;
use crate::errors::{AnalysisResult, GraphResult};
use crate::graph::Graph;
use crate::history::{HistoryStore, DEFAULT_CAPACITY};
use crate::mutator::{apply_edit, GraphEdit};
use crate::table::Table;
use crate::transformations::{
    filter_table, pivot_table, sort_table, Aggregation, FilterOperator, SortDirection,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    Cache,
    Analysis,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadOutcome {
    pub source: LoadSource,
    /// Absent when the tables could not be fingerprinted.
    pub fingerprint: Option<Fingerprint>,
    /// Set when the fresh result could not be written to the cache.
    pub cache_warning: Option<String>,
}

pub struct Workspace<S: CacheStore> {
    tables: Vec<Table>,
    cache: ContentCache<S>,
    history: HistoryStore<Graph>,
    session: AnalysisSession,
}

impl Workspace<ConfiguredStore> {
    /// Workspace with the cache store and history capacity from `config`.
    pub fn from_config(config: &AppConfig, engine: Arc<dyn AnalysisEngine>) -> Self {
        Self::with_history_capacity(config.cache_store(), engine, config.history_capacity)
    }
}

impl<S: CacheStore> Workspace<S> {
    pub fn new(store: S, engine: Arc<dyn AnalysisEngine>) -> Self {
        Self::with_history_capacity(store, engine, DEFAULT_CAPACITY)
    }

    pub fn with_history_capacity(
        store: S,
        engine: Arc<dyn AnalysisEngine>,
        capacity: usize,
    ) -> Self {
        Self {
            tables: Vec::new(),
            cache: ContentCache::new(store),
            history: HistoryStore::with_capacity(Graph::default(), capacity),
            session: AnalysisSession::new(engine),
        }
    }

    /// Load tables and obtain their graph, from the cache when possible and
    /// from the analysis engine otherwise. On success the history restarts
    /// at the loaded graph; on failure the workspace is left untouched.
    pub async fn load<F>(
        &mut self,
        tables: Vec<Table>,
        config: &AnalysisConfig,
        on_progress: F,
    ) -> AnalysisResult<LoadOutcome>
    where
        F: FnMut(&ProgressLine),
    {
        let fingerprint = match fingerprint_tables(&tables) {
            Ok(fp) => Some(fp),
            Err(e) => {
                warn!("Could not fingerprint tables, caching disabled: {}", e);
                None
            }
        };
        let cache_key = fingerprint.as_ref().filter(|_| config.use_cache);

        if let Some(fp) = cache_key {
            if let Some(entry) = self.cache.get(fp) {
                info!(fingerprint = %fp, "Loaded graph from cache ({})", entry.graph.stats());
                self.tables = tables;
                self.history.reset(entry.graph);
                return Ok(LoadOutcome {
                    source: LoadSource::Cache,
                    fingerprint,
                    cache_warning: None,
                });
            }
        }

        let ticket = self.session.submit(tables.clone(), config.clone());
        let graph = ticket.wait(on_progress).await?;

        let cache_warning = match cache_key {
            Some(fp) => match self.cache.put(fp, &graph, &tables) {
                Ok(_) => None,
                Err(e) => {
                    warn!(fingerprint = %fp, "Failed to cache analysis result: {}", e);
                    Some(e.to_string())
                }
            },
            None => None,
        };

        self.tables = tables;
        self.history.reset(graph);
        Ok(LoadOutcome {
            source: LoadSource::Analysis,
            fingerprint,
            cache_warning,
        })
    }

    /// Apply an edit to the current graph. Returns whether a new history
    /// entry was recorded; a rejected edit leaves the history unchanged.
    pub fn apply(&mut self, edit: &GraphEdit) -> GraphResult<bool> {
        let recorded = self.history.try_update(|graph| apply_edit(graph, edit))?;
        if !recorded {
            debug!("Edit produced an identical graph, not recorded");
        }
        Ok(recorded)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn graph(&self) -> &Graph {
        self.history.current()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn cache(&self) -> &ContentCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ContentCache<S> {
        &mut self.cache
    }

    /// Sorted view of a loaded table, `None` when the index is out of range.
    pub fn sort(&self, table: usize, column: usize, direction: SortDirection) -> Option<Table> {
        self.tables
            .get(table)
            .map(|t| sort_table(t, column, direction))
    }

    pub fn filter(
        &self,
        table: usize,
        column: usize,
        operator: &FilterOperator,
        value: &str,
    ) -> Option<Table> {
        self.tables
            .get(table)
            .map(|t| filter_table(t, column, operator, value))
    }

    pub fn pivot(
        &self,
        table: usize,
        group_column: usize,
        value_column: usize,
        aggregation: Aggregation,
    ) -> Option<Table> {
        self.tables
            .get(table)
            .map(|t| pivot_table(t, group_column, value_column, aggregation))
    }
}
