//! Graph-related error types
//!
//! Covers malformed externally supplied graphs and edits the mutator
//! refuses to apply.
//!
//! # Examples
//!
//! ```rust
//! use sheetgraph::errors::GraphError;
//!
//! let err = GraphError::DanglingLink {
//!     link: "l1".to_string(),
//!     endpoint: "missing".to_string(),
//! };
//! assert!(err.is_malformed_input());
//! ```

use thiserror::Error;

/// Graph-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A link references a node that is not in the graph
    #[error("Link '{link}' references missing node '{endpoint}'")]
    DanglingLink {
        /// Link identifier
        link: String,
        /// The unresolved source or target id
        endpoint: String,
    },

    /// Two nodes share an id
    #[error("Duplicate node id '{0}'")]
    DuplicateNodeId(String),

    /// Two links share an id
    #[error("Duplicate link id '{0}'")]
    DuplicateLinkId(String),

    /// Node already exists
    #[error("Node '{0}' already exists")]
    NodeAlreadyExists(String),

    /// Strict link creation against missing endpoints
    #[error("Invalid link {source_id} -> {target_id}: {reason}")]
    InvalidLink {
        /// Requested source node
        source_id: String,
        /// Requested target node
        target_id: String,
        /// Why the link was rejected
        reason: String,
    },

    /// Payload does not have the expected graph shape
    #[error("Invalid graph structure: {0}")]
    InvalidStructure(String),
}

impl GraphError {
    /// Errors caused by input that violates graph integrity
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            GraphError::DanglingLink { .. }
                | GraphError::DuplicateNodeId(_)
                | GraphError::DuplicateLinkId(_)
                | GraphError::InvalidLink { .. }
                | GraphError::InvalidStructure(_)
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::DanglingLink { .. }
            | GraphError::DuplicateNodeId(_)
            | GraphError::DuplicateLinkId(_)
            | GraphError::InvalidLink { .. }
            | GraphError::InvalidStructure(_) => "MALFORMED_INPUT",
            GraphError::NodeAlreadyExists(_) => "CONFLICT",
        }
    }
}
