//! Postgres document store
//!
//! One row per key in `rated_stats`. The conditional `UPDATE ... WHERE
//! version = $expected` is the compare-and-swap primitive.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::RunningStat;

use super::{DocumentStore, StoreError, StoredStat};

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new store with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM rated_stats WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(version)
    }

    async fn upsert(&self, key: &str, value: f64, count: i64) -> Result<i64, StoreError> {
        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO rated_stats (key, value, count, version)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value,
                          count = EXCLUDED.count,
                          version = rated_stats.version + 1,
                          updated_at = NOW()
            RETURNING version
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(count)
        .fetch_one(&self.pool)
        .await?;

        Ok(version)
    }

    async fn create(&self, key: &str, value: f64, count: i64) -> Result<i64, StoreError> {
        let version: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO rated_stats (key, value, count, version)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (key) DO NOTHING
            RETURNING version
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(count)
        .fetch_optional(&self.pool)
        .await?;

        match version {
            Some(version) => Ok(version),
            None => {
                let actual = self.current_version(key).await?.unwrap_or(0);
                Err(StoreError::VersionConflict {
                    key: key.to_string(),
                    expected: 0,
                    actual: to_version(key, actual)?,
                })
            }
        }
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        value: f64,
        count: i64,
        expected: u64,
    ) -> Result<i64, StoreError> {
        let expected_db = i64::try_from(expected)
            .map_err(|_| StoreError::invalid_record(key, "expected version out of range"))?;

        let version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE rated_stats
            SET value = $2, count = $3, version = version + 1, updated_at = NOW()
            WHERE key = $1 AND version = $4
            RETURNING version
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(count)
        .bind(expected_db)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(version) = version {
            return Ok(version);
        }

        match self.current_version(key).await? {
            None => Err(StoreError::NotFound(key.to_string())),
            Some(actual) => Err(StoreError::VersionConflict {
                key: key.to_string(),
                expected,
                actual: to_version(key, actual)?,
            }),
        }
    }
}

fn to_version(key: &str, version: i64) -> Result<u64, StoreError> {
    u64::try_from(version).map_err(|_| StoreError::invalid_record(key, "negative version"))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn read(&self, key: &str) -> Result<StoredStat, StoreError> {
        let row: Option<(f64, i64, i64)> =
            sqlx::query_as("SELECT value, count, version FROM rated_stats WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let (value, count, version) = row.ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let count = u64::try_from(count)
            .map_err(|_| StoreError::invalid_record(key, "negative count"))?;

        Ok(StoredStat {
            stat: RunningStat::new(value, count),
            version: to_version(key, version)?,
        })
    }

    async fn write(
        &self,
        key: &str,
        stat: &RunningStat,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let count = i64::try_from(stat.count)
            .map_err(|_| StoreError::invalid_record(key, "count out of range"))?;

        let version = match expected_version {
            None => self.upsert(key, stat.value, count).await?,
            Some(0) => self.create(key, stat.value, count).await?,
            Some(expected) => self.compare_and_swap(key, stat.value, count, expected).await?,
        };

        to_version(key, version)
    }

    fn backend_type(&self) -> &'static str {
        "postgres"
    }
}
