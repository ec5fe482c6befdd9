//! Cache-related error types
//!
//! Corrupt entries never surface here: they are purged on read and reported
//! as a miss. What remains are write-side failures, which callers log and
//! move past.

use thiserror::Error;

/// Errors from the persisted result cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying store could not be read or written
    #[error("Cache storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Entry could not be serialized
    #[error("Cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store refused the write because it is full
    #[error("Cache quota exceeded: needed {needed} bytes, {available} available")]
    QuotaExceeded {
        /// Size of the rejected value
        needed: usize,
        /// Remaining capacity
        available: usize,
    },

    /// Stored entry exists but cannot be decoded
    #[error("Corrupt cache entry '{key}': {reason}")]
    CorruptEntry {
        /// Key of the unreadable entry
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// String is not a well-formed fingerprint
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}

impl CacheError {
    /// Failures writing to the store, which never block the in-memory result
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            CacheError::Storage(_) | CacheError::Serialization(_) | CacheError::QuotaExceeded { .. }
        )
    }

    /// Entry exists but is unreadable and should be purged
    pub fn is_corrupt_entry(&self) -> bool {
        matches!(self, CacheError::CorruptEntry { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            CacheError::Storage(_) => "STORAGE_ERROR",
            CacheError::Serialization(_) => "SERIALIZATION_ERROR",
            CacheError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            CacheError::CorruptEntry { .. } => "CORRUPT_ENTRY",
            CacheError::InvalidFingerprint(_) => "VALIDATION_FAILED",
        }
    }
}
