//! Command definitions
//!
//! Commands represent intentions to change the stored statistics.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, RunningStat};

/// Maximum accepted joke id length
const MAX_JOKE_ID_LEN: usize = 128;

/// Validate a joke id and build the key of one of its statistics
fn stat_key(joke_id: &str, stat: &str) -> Result<String, DomainError> {
    if joke_id.is_empty() || joke_id.len() > MAX_JOKE_ID_LEN || joke_id.contains('/') {
        return Err(DomainError::InvalidJokeId(joke_id.to_string()));
    }
    Ok(format!("jokes/{}/{}", joke_id, stat))
}

/// Store key of a joke's star rating
pub fn rating_key(joke_id: &str) -> Result<String, DomainError> {
    stat_key(joke_id, "rating")
}

/// Store key of a joke's battle win rate
pub fn battle_key(joke_id: &str) -> Result<String, DomainError> {
    stat_key(joke_id, "battle")
}

// =========================================================================
// RegisterJokeCommand
// =========================================================================

/// Command to create the empty statistics of a newly submitted joke
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterJokeCommand {
    pub joke_id: String,
}

impl RegisterJokeCommand {
    pub fn new(joke_id: impl Into<String>) -> Self {
        Self {
            joke_id: joke_id.into(),
        }
    }
}

// =========================================================================
// RateJokeCommand
// =========================================================================

/// Command to fold one star rating into a joke's average
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateJokeCommand {
    pub joke_id: String,
    pub rating: f64,
}

impl RateJokeCommand {
    pub fn new(joke_id: impl Into<String>, rating: f64) -> Self {
        Self {
            joke_id: joke_id.into(),
            rating,
        }
    }
}

// =========================================================================
// BattleVoteCommand
// =========================================================================

/// Command to record the outcome of one joke battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleVoteCommand {
    pub winner_id: String,
    pub loser_id: String,
}

impl BattleVoteCommand {
    pub fn new(winner_id: impl Into<String>, loser_id: impl Into<String>) -> Self {
        Self {
            winner_id: winner_id.into(),
            loser_id: loser_id.into(),
        }
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisterJokeResult {
    pub joke_id: String,
    pub rating: RunningStat,
    pub battle: RunningStat,
}

/// Result of a successful rating
#[derive(Debug, Clone, Serialize)]
pub struct RateJokeResult {
    pub joke_id: String,
    pub value: f64,
    pub count: u64,
}

/// Result of a successful battle vote
#[derive(Debug, Clone, Serialize)]
pub struct BattleVoteResult {
    pub winner: RunningStat,
    pub loser: RunningStat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_keys() {
        assert_eq!(rating_key("42").unwrap(), "jokes/42/rating");
        assert_eq!(battle_key("aBc-9").unwrap(), "jokes/aBc-9/battle");
    }

    #[test]
    fn test_invalid_joke_ids() {
        let too_long = "x".repeat(MAX_JOKE_ID_LEN + 1);
        for id in ["", "a/b", too_long.as_str()] {
            assert!(
                matches!(rating_key(id), Err(DomainError::InvalidJokeId(_))),
                "Expected error for id: {:?}",
                id
            );
        }
    }
}
