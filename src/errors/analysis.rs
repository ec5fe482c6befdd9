//! Errors from the external collaborators (analysis engine, query
//! translator). Messages from a failing collaborator are kept verbatim.

use thiserror::Error;

use super::GraphError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Collaborator reported a failure
    #[error("{0}")]
    Failed(String),

    /// Collaborator answered with something that is not a graph
    #[error("Invalid analysis response: {0}")]
    InvalidResponse(#[from] GraphError),

    /// Request was superseded by a newer one before it completed
    #[error("Analysis request #{generation} was cancelled")]
    Cancelled {
        /// Generation number of the cancelled request
        generation: u64,
    },

    /// Query translation failed
    #[error("Query translation failed: {0}")]
    Translation(String),
}

impl AnalysisError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalysisError::Cancelled { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AnalysisError::Failed(_) => "COLLABORATOR_FAILED",
            AnalysisError::InvalidResponse(_) => "INVALID_RESPONSE",
            AnalysisError::Cancelled { .. } => "CANCELLED",
            AnalysisError::Translation(_) => "TRANSLATION_FAILED",
        }
    }
}
