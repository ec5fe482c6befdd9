//! Domain-specific error types for sheetgraph
//!
//! Each domain owns a structured error enum so callers can tell malformed
//! input apart from storage trouble or a failing collaborator.
//!
//! # Error Categories
//!
//! - **GraphError**: malformed graphs (dangling links, duplicate ids) and
//!   rejected edits
//! - **CacheError**: persisted cache reads/writes and fingerprint parsing
//! - **AnalysisError**: external analysis and query-translation collaborators
//!
//! # Examples
//!
//! ```rust
//! use sheetgraph::errors::{AnalysisError, GraphError};
//!
//! let err = GraphError::DuplicateNodeId("n1".to_string());
//! assert_eq!(err.error_code(), "MALFORMED_INPUT");
//!
//! let err = AnalysisError::Cancelled { generation: 3 };
//! assert!(err.is_cancelled());
//! ```

pub mod analysis;
pub mod cache;
pub mod graph;

pub use analysis::AnalysisError;
pub use cache::CacheError;
pub use graph::GraphError;

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type alias for collaborator calls
pub type AnalysisResult<T> = Result<T, AnalysisError>;
