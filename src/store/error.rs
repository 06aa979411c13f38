//! Store Errors
//!
//! Error types for document store operations.

/// Errors that can occur in a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record at the key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Optimistic concurrency conflict
    #[error("Version conflict for {key}: expected version {expected}, found {actual}")]
    VersionConflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    /// Stored data violates the statistic's invariants
    #[error("Invalid record at {key}: {reason}")]
    InvalidRecord { key: String, reason: String },

    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Create an invalid record error
    pub fn invalid_record(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is a version conflict
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. }
                | StoreError::Unavailable(_)
                | StoreError::Database(_)
        )
    }
}
