//! Observation type
//!
//! Domain primitive for a single vote or outcome folded into a running average.
//! Observations are validated against a [`StatDomain`] at construction time,
//! so an out-of-range rating never reaches the store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DomainError;

/// Declared bounds and default of a running statistic.
///
/// # Invariants
/// - `min <= max`, both finite
/// - `default` is the value of a statistic with `count == 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatDomain {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl StatDomain {
    /// Star ratings, 1 to 5. New jokes start at 0 with no votes.
    pub const STAR_RATING: StatDomain = StatDomain {
        min: 1.0,
        max: 5.0,
        default: 0.0,
    };

    /// Battle outcomes: 1 for a win, 0 for a loss. The average is the win rate.
    pub const BATTLE_OUTCOME: StatDomain = StatDomain {
        min: 0.0,
        max: 1.0,
        default: 0.0,
    };

    /// Check whether a value lies within the bounds (inclusive)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Pull a computed average back into bounds.
    ///
    /// Only float drift should ever need this: the mean of in-range
    /// observations is in range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// A validated observation.
///
/// # Example
/// ```
/// use joke_stats::domain::{Observation, StatDomain};
///
/// let obs = Observation::new(4.0, &StatDomain::STAR_RATING).unwrap();
/// assert_eq!(obs.value(), 4.0);
/// assert!(Observation::new(6.0, &StatDomain::STAR_RATING).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Observation(f64);

impl Observation {
    /// Create an observation, rejecting non-finite and out-of-range values.
    pub fn new(value: f64, domain: &StatDomain) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::NonFiniteObservation);
        }

        if !domain.contains(value) {
            return Err(DomainError::invalid_observation(
                value, domain.min, domain.max,
            ));
        }

        Ok(Self(value))
    }

    /// Create an observation that is only required to be finite.
    pub fn finite(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::NonFiniteObservation);
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
