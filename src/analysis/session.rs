use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{ingest_response, AnalysisConfig, AnalysisEngine, ProgressLevel, ProgressLine};
use crate::errors::{AnalysisError, AnalysisResult};
use crate::graph::Graph;
use crate::table::Table;

const PROGRESS_BUFFER: usize = 256;

/// Owns the single in-flight analysis request.
///
/// Submitting a new request aborts the previous task, so a stale response
/// can never be delivered after a newer one was asked for.
pub struct AnalysisSession {
    engine: Arc<dyn AnalysisEngine>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl AnalysisSession {
    pub fn new(engine: Arc<dyn AnalysisEngine>) -> Self {
        Self {
            engine,
            generation: 0,
            in_flight: None,
        }
    }

    /// Generation number of the most recent request, zero before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start a request, cancelling any outstanding one. Must be called from
    /// within a tokio runtime.
    pub fn submit(&mut self, tables: Vec<Table>, config: AnalysisConfig) -> AnalysisTicket {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        let (progress_tx, progress_rx) = mpsc::channel(PROGRESS_BUFFER);
        let (result_tx, result_rx) = oneshot::channel();
        let engine = Arc::clone(&self.engine);
        let verbose = config.verbose_log;

        info!(
            generation,
            depth = ?config.depth,
            "Submitting analysis of {} tables",
            tables.len()
        );
        let handle = tokio::spawn(async move {
            let outcome = engine
                .analyze(&tables, &config, progress_tx)
                .await
                .and_then(ingest_response);
            let _ = result_tx.send(outcome);
        });
        self.in_flight = Some(handle);

        AnalysisTicket {
            generation,
            verbose,
            progress: progress_rx,
            result: result_rx,
        }
    }

    /// Abort the outstanding request, if any. Its ticket resolves to
    /// [`AnalysisError::Cancelled`].
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                handle.abort();
                info!(generation = self.generation, "Cancelled analysis request");
            }
        }
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// Receiving side of one submitted request.
pub struct AnalysisTicket {
    generation: u64,
    verbose: bool,
    progress: mpsc::Receiver<ProgressLine>,
    result: oneshot::Receiver<AnalysisResult<Graph>>,
}

impl AnalysisTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the result, handing each progress line to `on_progress` as it
    /// arrives. `detail` lines are only forwarded when verbose logging was
    /// requested.
    pub async fn wait<F>(mut self, mut on_progress: F) -> AnalysisResult<Graph>
    where
        F: FnMut(&ProgressLine),
    {
        let generation = self.generation;
        loop {
            tokio::select! {
                biased;
                Some(line) = self.progress.recv() => {
                    match line.level {
                        ProgressLevel::Info => info!(generation, "{}", line.message),
                        ProgressLevel::Detail if self.verbose => debug!(generation, "{}", line.message),
                        ProgressLevel::Detail => continue,
                    }
                    on_progress(&line);
                }
                outcome = &mut self.result => {
                    return match outcome {
                        Ok(Ok(graph)) => {
                            info!(generation, "Analysis completed ({})", graph.stats());
                            Ok(graph)
                        }
                        Ok(Err(e)) => {
                            info!(generation, "Analysis failed: {}", e);
                            Err(e)
                        }
                        Err(_) => Err(AnalysisError::Cancelled { generation }),
                    };
                }
            }
        }
    }
}
