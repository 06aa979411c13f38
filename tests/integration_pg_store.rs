//! Integration tests for the Postgres document store
//!
//! Run with: DATABASE_URL=... cargo test --test integration_pg_store -- --ignored

mod common;

use joke_stats::{
    AggregateStatUpdater, DocumentStore, PgDocumentStore, RunningStat, StatDomain, StoreError,
    UpdateError, UpdateMode,
};
use uuid::Uuid;

fn unique_key() -> String {
    format!("jokes/{}/rating", Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_create_and_read() {
    let store = PgDocumentStore::new(common::setup_test_db().await);
    let key = unique_key();

    let version = store
        .write(&key, &RunningStat::new(0.0, 0), Some(0))
        .await
        .unwrap();
    assert_eq!(version, 1);

    let stored = store.read(&key).await.unwrap();
    assert_eq!(stored.stat, RunningStat::new(0.0, 0));
    assert_eq!(stored.version, 1);

    // Creating again reports the existing version
    let result = store.write(&key, &RunningStat::new(0.0, 0), Some(0)).await;
    assert!(matches!(
        result,
        Err(StoreError::VersionConflict {
            expected: 0,
            actual: 1,
            ..
        })
    ));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_compare_and_swap() {
    let store = PgDocumentStore::new(common::setup_test_db().await);
    let key = unique_key();

    store
        .write(&key, &RunningStat::new(3.0, 1), Some(0))
        .await
        .unwrap();

    let version = store
        .write(&key, &RunningStat::new(4.0, 2), Some(1))
        .await
        .unwrap();
    assert_eq!(version, 2);

    // Stale version is refused and leaves the row alone
    let result = store.write(&key, &RunningStat::new(2.0, 2), Some(1)).await;
    assert!(matches!(
        result,
        Err(StoreError::VersionConflict {
            expected: 1,
            actual: 2,
            ..
        })
    ));

    let stored = store.read(&key).await.unwrap();
    assert_eq!(stored.stat, RunningStat::new(4.0, 2));
    assert_eq!(stored.version, 2);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_missing_key() {
    let store = PgDocumentStore::new(common::setup_test_db().await);
    let key = unique_key();

    assert!(matches!(
        store.read(&key).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.write(&key, &RunningStat::new(3.0, 1), Some(4)).await,
        Err(StoreError::NotFound(_))
    ));

    // Unconditional write creates the row
    let version = store
        .write(&key, &RunningStat::new(3.0, 1), None)
        .await
        .unwrap();
    assert_eq!(version, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_strict_updates_are_not_lost() {
    let store = PgDocumentStore::new(common::setup_test_db().await);
    let key = unique_key();
    let updater = AggregateStatUpdater::new(StatDomain::STAR_RATING)
        .with_options(common::fast_options().with_max_retries(16));

    updater.initialize(&store, &key).await.unwrap();

    let mut handles = Vec::new();
    for rating in [1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 4.0, 3.0] {
        let store = store.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            updater
                .apply(&store, &key, rating, UpdateMode::Strict)
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let stored = store.read(&key).await.unwrap();
    assert_eq!(stored.stat.count, 8);
    assert!((stored.stat.value - 27.0 / 8.0).abs() < 1e-9);
    assert_eq!(stored.version, 9);

    assert!(matches!(
        updater.initialize(&store, &key).await,
        Err(UpdateError::AlreadyExists(_))
    ));
}
