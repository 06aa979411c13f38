//! Document Store module
//!
//! The persistence collaborator of the stat updater: versioned read and
//! conditional write of one running statistic per key.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::{InMemoryStore, StoreCounters};
pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::RunningStat;

/// A running statistic together with the store's version token
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StoredStat {
    #[serde(flatten)]
    pub stat: RunningStat,
    /// Bumped by the store on every successful write; never 0 for a stored record
    pub version: u64,
}

/// Backend trait for versioned statistic records
///
/// Writes are atomic per key. `expected_version` turns a write into a
/// compare-and-swap:
/// - `None` writes unconditionally (creating the record if needed)
/// - `Some(0)` creates the record and fails if it already exists
/// - `Some(v)` replaces the record only if its current version is `v`
///
/// A failed compare reports `StoreError::VersionConflict`; a write against a
/// missing record with `Some(v)`, `v > 0`, reports `StoreError::NotFound`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the record at `key`
    async fn read(&self, key: &str) -> Result<StoredStat, StoreError>;

    /// Write `stat` at `key`, returning the new version
    async fn write(
        &self,
        key: &str,
        stat: &RunningStat,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
