//! Aggregate Stat Updater
//!
//! Folds one observation into a stored running average and persists it.
//! Every rating and battle vote in the service goes through here.

use crate::domain::{compute_next, DomainError, Observation, RunningStat, StatDomain};
use crate::store::{DocumentStore, StoreError, StoredStat};

use super::{ApplyOptions, UpdateError, UpdateMode};

/// Running-average updater for one statistic domain.
///
/// The store is injected per call, so the same updater works against any
/// [`DocumentStore`] backend. It keeps no state between calls and caches
/// nothing.
///
/// Cancellation: dropping an `apply` future before the write is issued
/// leaves the record untouched. Once the write is in flight the caller must
/// not assume it did not land.
#[derive(Debug, Clone, Copy)]
pub struct AggregateStatUpdater {
    domain: StatDomain,
    options: ApplyOptions,
}

impl AggregateStatUpdater {
    /// Create an updater with the default retry policy
    pub fn new(domain: StatDomain) -> Self {
        Self {
            domain,
            options: ApplyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn domain(&self) -> &StatDomain {
        &self.domain
    }

    pub fn options(&self) -> &ApplyOptions {
        &self.options
    }

    /// Pure next-state computation, clamped into the domain bounds
    pub fn compute_next(
        &self,
        current: RunningStat,
        observation: Observation,
    ) -> Result<RunningStat, DomainError> {
        let next = compute_next(current, observation)?;
        Ok(RunningStat {
            value: self.domain.clamp(next.value),
            ..next
        })
    }

    /// Fold `observation` into the record at `key` using the updater's
    /// retry policy
    pub async fn apply<S>(
        &self,
        store: &S,
        key: &str,
        observation: f64,
        mode: UpdateMode,
    ) -> Result<RunningStat, UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        self.apply_with(store, key, observation, mode, &self.options)
            .await
    }

    /// Fold `observation` into the record at `key` with an explicit retry
    /// policy. `options` only matters in strict mode.
    pub async fn apply_with<S>(
        &self,
        store: &S,
        key: &str,
        observation: f64,
        mode: UpdateMode,
        options: &ApplyOptions,
    ) -> Result<RunningStat, UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        // Validate before touching the store
        let observation = Observation::new(observation, &self.domain)?;

        match mode {
            UpdateMode::LastWriterWins => {
                self.apply_last_writer_wins(store, key, observation).await
            }
            UpdateMode::Strict => self.apply_strict(store, key, observation, options).await,
        }
    }

    async fn apply_last_writer_wins<S>(
        &self,
        store: &S,
        key: &str,
        observation: Observation,
    ) -> Result<RunningStat, UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        let current = self.read_checked(store, key).await?;
        let next = self.compute_next(current.stat, observation)?;

        store.write(key, &next, None).await?;

        Ok(next)
    }

    async fn apply_strict<S>(
        &self,
        store: &S,
        key: &str,
        observation: Observation,
        options: &ApplyOptions,
    ) -> Result<RunningStat, UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        let attempts = options.max_retries.saturating_add(1);

        for attempt in 0..attempts {
            let current = self.read_checked(store, key).await?;
            let next = self.compute_next(current.stat, observation)?;

            match store.write(key, &next, Some(current.version)).await {
                Ok(version) => {
                    tracing::debug!(
                        key,
                        version,
                        count = next.count,
                        backend = store.backend_type(),
                        "Stat updated"
                    );
                    return Ok(next);
                }
                Err(StoreError::VersionConflict {
                    expected, actual, ..
                }) => {
                    if attempt + 1 < attempts {
                        let delay = options.backoff(attempt);
                        tracing::debug!(
                            key,
                            expected,
                            actual,
                            "Version conflict, retrying (attempt {}/{}) after {:?}",
                            attempt + 1,
                            options.max_retries,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(UpdateError::Conflict {
            key: key.to_string(),
            attempts,
        })
    }

    /// Create the record at `key` as the domain's empty statistic
    pub async fn initialize<S>(&self, store: &S, key: &str) -> Result<RunningStat, UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        let empty = RunningStat::empty(&self.domain);

        match store.write(key, &empty, Some(0)).await {
            Ok(_) => Ok(empty),
            Err(StoreError::VersionConflict { .. }) => {
                Err(UpdateError::AlreadyExists(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create the record at `key` unless it exists.
    ///
    /// Returns the stored statistic and whether this call created it.
    pub async fn ensure<S>(&self, store: &S, key: &str) -> Result<(RunningStat, bool), UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        match self.initialize(store, key).await {
            Ok(stat) => Ok((stat, true)),
            Err(UpdateError::AlreadyExists(_)) => {
                let stored = self.read_checked(store, key).await?;
                Ok((stored.stat, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Read the record at `key`, rejecting values that break the invariants
    pub async fn current<S>(&self, store: &S, key: &str) -> Result<StoredStat, UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        self.read_checked(store, key).await
    }

    async fn read_checked<S>(&self, store: &S, key: &str) -> Result<StoredStat, UpdateError>
    where
        S: DocumentStore + ?Sized,
    {
        let stored = store.read(key).await?;

        let value = stored.stat.value;
        if !value.is_finite() {
            return Err(StoreError::invalid_record(key, format!("non-finite value {}", value)).into());
        }

        // The empty stat holds the domain default, which may lie outside the bounds
        if stored.stat.count > 0 && !self.domain.contains(value) {
            return Err(StoreError::invalid_record(
                key,
                format!(
                    "value {} outside [{}, {}]",
                    value, self.domain.min, self.domain.max
                ),
            )
            .into());
        }

        Ok(stored)
    }
}
