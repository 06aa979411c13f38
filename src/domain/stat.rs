//! Running statistic
//!
//! A `(value, count)` pair maintained by folding in one observation at a time,
//! without retaining the history of inputs.

use serde::{Deserialize, Serialize};

use super::{DomainError, Observation, StatDomain};

/// Running average over `count` observations.
///
/// # Invariants
/// - `count == 0` implies `value` is the domain default
/// - `count > 0` implies `value` is the mean of every folded observation
///   (up to floating point drift)
/// - `value` is never NaN
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningStat {
    pub value: f64,
    pub count: u64,
}

impl RunningStat {
    pub fn new(value: f64, count: u64) -> Self {
        Self { value, count }
    }

    /// The empty statistic of a domain
    pub fn empty(domain: &StatDomain) -> Self {
        Self {
            value: domain.default,
            count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Fold one observation in. See [`compute_next`].
    pub fn fold(self, observation: Observation) -> Result<Self, DomainError> {
        compute_next(self, observation)
    }
}

/// Compute the statistic after folding in one more observation.
///
/// `next.count = count + 1` and
/// `next.value = (value * count + observation) / next.count`, evaluated as
/// `value + (observation - value) / next.count` so that `value * count` never
/// has to be materialized for large counts. A zero count discards the current
/// value entirely and seeds with the observation.
pub fn compute_next(
    current: RunningStat,
    observation: Observation,
) -> Result<RunningStat, DomainError> {
    let count = current
        .count
        .checked_add(1)
        .ok_or(DomainError::CountOverflow)?;

    if current.is_empty() {
        return Ok(RunningStat {
            value: observation.value(),
            count,
        });
    }

    let value = current.value + (observation.value() - current.value) / count as f64;

    Ok(RunningStat { value, count })
}
