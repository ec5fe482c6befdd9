//! Boundary to the external analysis and query-translation collaborators.
//!
//! The collaborators themselves are opaque: the core only defines the
//! request/response contract and validates what comes back.

mod session;

pub use session::{AnalysisSession, AnalysisTicket};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::warn;

use crate::errors::{AnalysisError, AnalysisResult};
use crate::graph::Graph;
use crate::table::Table;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    #[default]
    Quick,
    Deep,
}

impl FromStr for AnalysisDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(AnalysisDepth::Quick),
            "deep" => Ok(AnalysisDepth::Deep),
            other => Err(format!("unknown analysis depth '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub depth: AnalysisDepth,
    /// When false the content cache is neither read nor written.
    pub use_cache: bool,
    /// Forward `detail` progress lines as well as `info` ones.
    pub verbose_log: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: AnalysisDepth::Quick,
            use_cache: true,
            verbose_log: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Info,
    Detail,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProgressLine {
    pub level: ProgressLevel,
    pub message: String,
}

impl ProgressLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ProgressLevel::Info,
            message: message.into(),
        }
    }

    pub fn detail(message: impl Into<String>) -> Self {
        Self {
            level: ProgressLevel::Detail,
            message: message.into(),
        }
    }
}

/// Converts raw tables into an initial graph payload.
///
/// Implementations report progress through `progress` and return the raw
/// payload; shape and integrity checks happen in [`ingest_response`].
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn analyze(
        &self,
        tables: &[Table],
        config: &AnalysisConfig,
        progress: mpsc::Sender<ProgressLine>,
    ) -> AnalysisResult<Value>;
}

/// Turns a natural-language question into a query string.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    async fn translate(&self, text: &str) -> AnalysisResult<String>;
}

/// Single translation attempt. A blank answer counts as a failure.
pub async fn translate_query(
    translator: &dyn QueryTranslator,
    text: &str,
) -> AnalysisResult<String> {
    let query = translator.translate(text).await?;
    let query = query.trim();
    if query.is_empty() {
        return Err(AnalysisError::Translation(format!(
            "no query produced for '{}'",
            text
        )));
    }
    Ok(query.to_string())
}

/// Parse a collaborator payload into a graph. A missing `nodes` or `links`
/// array is rejected; duplicate ids and dangling links are repaired.
pub fn ingest_response(payload: Value) -> AnalysisResult<Graph> {
    let mut graph = Graph::from_payload(payload)?;
    for repair in graph.repair() {
        warn!("Analysis response repaired: {}", repair);
    }
    Ok(graph)
}
