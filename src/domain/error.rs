//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These errors are raised before any store I/O happens and are never persisted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Observation outside the statistic's declared bounds
    #[error("Observation {value} is outside the allowed range [{min}, {max}]")]
    InvalidObservation { value: f64, min: f64, max: f64 },

    /// NaN or infinite observation
    #[error("Observation must be a finite number")]
    NonFiniteObservation,

    /// Folding one more observation would overflow the counter
    #[error("Observation count overflow")]
    CountOverflow,

    /// Joke identifier cannot be turned into a store key
    #[error("Invalid joke id: {0}")]
    InvalidJokeId(String),

    /// A joke cannot battle itself
    #[error("A joke cannot battle itself: {0}")]
    SelfBattle(String),
}

impl DomainError {
    /// Create an out-of-range observation error
    pub fn invalid_observation(value: f64, min: f64, max: f64) -> Self {
        Self::InvalidObservation { value, min, max }
    }
}
