pub mod to_json;
pub mod to_yaml;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;
use crate::graph::Graph;
use crate::table::Table;

/// Graph together with the tables it was derived from.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ExportBundle {
    pub graph: Graph,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl ExportBundle {
    pub fn new(graph: Graph, tables: Vec<Table>) -> Self {
        Self { graph, tables }
    }
}

impl From<CacheEntry> for ExportBundle {
    fn from(entry: CacheEntry) -> Self {
        Self {
            graph: entry.graph,
            tables: entry.tables,
        }
    }
}
