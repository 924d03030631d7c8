//! PostgreSQL cache repository

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::cache::{CacheEntry, CacheKey, CacheRepository};
use crate::domain::search::CachedSearchPayload;
use crate::domain::telemetry::QueryLogId;
use crate::domain::DomainError;

/// Default table holding cache entries
pub const DEFAULT_CACHE_TABLE: &str = "search_cache";

/// Cache repository backed by a PostgreSQL table
///
/// `cache_key` is the primary key, so writes are upserts and at most one row
/// exists per key. Hit increments are a single atomic `UPDATE`.
pub struct PostgresCacheRepository {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresCacheRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCacheRepository")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresCacheRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, DEFAULT_CACHE_TABLE)
    }

    pub fn with_table(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Ensures the cache table and its expiry index exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let create = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                cache_key VARCHAR(255) PRIMARY KEY,
                payload JSONB NOT NULL,
                query_log_id VARCHAR(255),
                expires_at TIMESTAMPTZ NOT NULL,
                hit_count BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            table = self.table_name
        );

        sqlx::query(&create)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create cache table: {}", e)))?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS {table}_expires_at_idx ON {table} (expires_at)",
            table = self.table_name
        );

        sqlx::query(&index)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create cache index: {}", e)))?;

        Ok(())
    }

    fn select_columns() -> &'static str {
        "cache_key, payload, query_log_id, expires_at, hit_count, created_at"
    }

    fn row_to_entry(row: &PgRow) -> Result<CacheEntry, DomainError> {
        let payload: serde_json::Value = row.get("payload");
        let payload: CachedSearchPayload = serde_json::from_value(payload).map_err(|e| {
            DomainError::cache(format!("Failed to deserialize cache payload: {}", e))
        })?;

        let key: String = row.get("cache_key");
        let query_log_id: Option<String> = row.get("query_log_id");
        let hit_count: i64 = row.get("hit_count");

        Ok(CacheEntry {
            key: CacheKey::new(key),
            payload,
            query_log_id: query_log_id.map(QueryLogId::new),
            expires_at: row.get("expires_at"),
            hit_count: hit_count.max(0) as u64,
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl CacheRepository for PostgresCacheRepository {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, DomainError> {
        let query = format!(
            "SELECT {} FROM {} WHERE cache_key = $1",
            Self::select_columns(),
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to read cache entry: {}", e)))?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn find_live(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, DomainError> {
        let query = format!(
            r#"
            SELECT {} FROM {}
            WHERE cache_key = $1 AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            Self::select_columns(),
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to read cache entry: {}", e)))?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), DomainError> {
        let payload = serde_json::to_value(&entry.payload).map_err(|e| {
            DomainError::cache(format!("Failed to serialize cache payload: {}", e))
        })?;

        let query = format!(
            r#"
            INSERT INTO {} (cache_key, payload, query_log_id, expires_at, hit_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (cache_key) DO UPDATE SET
                payload = EXCLUDED.payload,
                query_log_id = EXCLUDED.query_log_id,
                expires_at = EXCLUDED.expires_at,
                hit_count = EXCLUDED.hit_count,
                created_at = EXCLUDED.created_at
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(entry.key.as_str())
            .bind(&payload)
            .bind(entry.query_log_id.as_ref().map(|id| id.as_str()))
            .bind(entry.expires_at)
            .bind(entry.hit_count as i64)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to write cache entry: {}", e)))?;

        Ok(())
    }

    async fn increment_hits(&self, key: &CacheKey) -> Result<Option<u64>, DomainError> {
        let query = format!(
            "UPDATE {} SET hit_count = hit_count + 1 WHERE cache_key = $1 RETURNING hit_count",
            self.table_name
        );

        let count: Option<i64> = sqlx::query_scalar(&query)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to increment hit count: {}", e)))?;

        Ok(count.map(|c| c.max(0) as u64))
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, DomainError> {
        let query = format!("DELETE FROM {} WHERE cache_key = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to delete cache entry: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let query = format!("DELETE FROM {} WHERE expires_at <= $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::cache(format!("Failed to delete expired cache entries: {}", e))
            })?;

        Ok(result.rows_affected() as usize)
    }

    async fn list(&self) -> Result<Vec<CacheEntry>, DomainError> {
        let query = format!(
            "SELECT {} FROM {} ORDER BY created_at",
            Self::select_columns(),
            self.table_name
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to list cache entries: {}", e)))?;

        rows.iter().map(Self::row_to_entry).collect()
    }
}
