//! In-memory document store
//!
//! Process-local versioned store. Backs local development
//! (`STORE_BACKEND=memory`) and the test suite, which relies on its call
//! counters and fault injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::RunningStat;

use super::{DocumentStore, StoreError, StoredStat};

/// Snapshot of the store's call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounters {
    pub reads: u64,
    pub writes: u64,
    pub conflicts: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, StoredStat>>,
    reads: AtomicU64,
    writes: AtomicU64,
    conflicts: AtomicU64,
    injected_conflicts: AtomicU64,
    injected_write_failures: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record at version 1, bypassing the counters
    pub async fn insert(&self, key: impl Into<String>, stat: RunningStat) {
        self.records
            .write()
            .await
            .insert(key.into(), StoredStat { stat, version: 1 });
    }

    /// Peek at a record, bypassing the counters
    pub async fn get(&self, key: &str) -> Option<StoredStat> {
        self.records.read().await.get(key).copied()
    }

    pub fn counters(&self) -> StoreCounters {
        StoreCounters {
            reads: self.reads.load(Ordering::SeqCst),
            writes: self.writes.load(Ordering::SeqCst),
            conflicts: self.conflicts.load(Ordering::SeqCst),
        }
    }

    /// Make the next `n` conditional writes fail with a version conflict
    /// without touching the record
    pub fn fail_next_writes_with_conflict(&self, n: u64) {
        self.injected_conflicts.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` writes fail with `StoreError::Unavailable` while
    /// reads keep working
    pub fn fail_next_writes_unavailable(&self, n: u64) {
        self.injected_write_failures.store(n, Ordering::SeqCst);
    }

    /// Make every read and write fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is switched off".to_string(),
            ));
        }
        Ok(())
    }

    fn take_injected_write_failure(&self) -> bool {
        self.injected_write_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn take_injected_conflict(&self) -> bool {
        self.injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn conflict(&self, key: &str, expected: u64, actual: u64) -> StoreError {
        self.conflicts.fetch_add(1, Ordering::SeqCst);
        StoreError::VersionConflict {
            key: key.to_string(),
            expected,
            actual,
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn read(&self, key: &str) -> Result<StoredStat, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        self.records
            .read()
            .await
            .get(key)
            .copied()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn write(
        &self,
        key: &str,
        stat: &RunningStat,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if self.take_injected_write_failure() {
            return Err(StoreError::Unavailable(format!("injected write failure for {}", key)));
        }

        // Compare and set under a single write lock
        let mut records = self.records.write().await;
        let current = records.get(key).map(|r| r.version).unwrap_or(0);

        if let Some(expected) = expected_version {
            if expected > 0 && current == 0 {
                return Err(StoreError::NotFound(key.to_string()));
            }
            if current != expected {
                return Err(self.conflict(key, expected, current));
            }
            if self.take_injected_conflict() {
                return Err(self.conflict(key, expected, current + 1));
            }
        }

        let version = current + 1;
        records.insert(
            key.to_string(),
            StoredStat {
                stat: *stat,
                version,
            },
        );

        Ok(version)
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
