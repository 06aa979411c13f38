//! Updater Errors

use crate::domain::DomainError;
use crate::store::StoreError;

/// Errors returned by [`super::AggregateStatUpdater`]
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Observation rejected before any store I/O
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),

    /// Strict mode lost every compare-and-swap it attempted
    #[error("Version conflict on {key} after {attempts} attempt(s)")]
    Conflict { key: String, attempts: u32 },

    /// The store's read or write failed
    #[error("Store error: {0}")]
    Store(StoreError),

    /// `initialize` found a record already in place
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
}

impl UpdateError {
    /// Short result kind for callers that branch on the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            UpdateError::Validation(_) => "ValidationError",
            UpdateError::Conflict { .. } => "Conflict",
            UpdateError::Store(_) => "StoreError",
            UpdateError::AlreadyExists(_) => "AlreadyExists",
        }
    }

    /// Check if the caller may retry the whole operation
    pub fn is_retryable(&self) -> bool {
        match self {
            UpdateError::Conflict { .. } => true,
            UpdateError::Store(e) => e.is_retryable(),
            UpdateError::Validation(_) | UpdateError::AlreadyExists(_) => false,
        }
    }
}

impl From<StoreError> for UpdateError {
    fn from(err: StoreError) -> Self {
        UpdateError::Store(err)
    }
}
