//! Common test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use joke_stats::api::AppState;
use joke_stats::{
    ApplyOptions, DocumentStore, InMemoryStore, RunningStat, StoreError, StoredStat, UpdateMode,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tokio::sync::Barrier;

/// Retry policy without backoff delays
pub fn fast_options() -> ApplyOptions {
    ApplyOptions::default().with_base_delay(Duration::ZERO)
}

/// Router state over a fresh in-memory store
pub fn memory_state(mode: UpdateMode) -> (Arc<InMemoryStore>, AppState) {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), mode, fast_options());
    (store, state)
}

/// Store wrapper that forces concurrent callers to interleave.
///
/// The first `parties` reads each wait at a barrier after reading, so every
/// caller has read the same state before any of them writes. Later reads pass
/// straight through.
pub struct InterleavingStore {
    pub inner: InMemoryStore,
    barrier: Barrier,
    gated_reads: AtomicUsize,
}

impl InterleavingStore {
    pub async fn new(parties: usize, key: &str, initial: RunningStat) -> Self {
        let inner = InMemoryStore::new();
        inner.insert(key, initial).await;
        Self {
            inner,
            barrier: Barrier::new(parties),
            gated_reads: AtomicUsize::new(parties),
        }
    }
}

#[async_trait]
impl DocumentStore for InterleavingStore {
    async fn read(&self, key: &str) -> Result<StoredStat, StoreError> {
        let result = self.inner.read(key).await;

        let gated = self
            .gated_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if gated {
            self.barrier.wait().await;
        }

        result
    }

    async fn write(
        &self,
        key: &str,
        stat: &RunningStat,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        self.inner.write(key, stat, expected_version).await
    }

    fn backend_type(&self) -> &'static str {
        "interleaving"
    }
}

/// Connect to the test database and make sure the stats table exists.
/// Tests run in parallel against it, so each uses its own keys.
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Plain string queries run over the simple protocol, so multi-statement SQL works
    pool.execute(include_str!("../../migrations/001_create_rated_stats.sql"))
        .await
        .expect("Failed to apply schema");

    pool
}
