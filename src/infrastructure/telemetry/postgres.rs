//! PostgreSQL query log repository

use std::fmt::Debug;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::search::SearchFilters;
use crate::domain::telemetry::{QueryLogRepository, SearchQueryLogEntry};
use crate::domain::DomainError;

/// Default table holding query log rows
pub const DEFAULT_QUERY_LOG_TABLE: &str = "search_query_log";

/// Append-only query log stored in PostgreSQL
pub struct PostgresQueryLogRepository {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresQueryLogRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresQueryLogRepository")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresQueryLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table_name: DEFAULT_QUERY_LOG_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Ensures the query log table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id VARCHAR(255) PRIMARY KEY,
                user_id VARCHAR(255),
                query TEXT NOT NULL,
                filters JSONB,
                result_count BIGINT NOT NULL,
                response_time_ms BIGINT NOT NULL,
                cache_hit BOOLEAN NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS {table}_user_created_idx
                ON {table} (user_id, created_at DESC)
            "#,
            table = self.table_name
        );

        sqlx::raw_sql(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to create query log table: {}", e))
            })?;

        Ok(())
    }

    fn row_to_entry(row: &PgRow) -> Result<SearchQueryLogEntry, DomainError> {
        let filters: Option<serde_json::Value> = row.get("filters");
        let filters: Option<SearchFilters> = filters
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                DomainError::telemetry(format!("Failed to deserialize query filters: {}", e))
            })?;

        let id: String = row.get("id");
        let result_count: i64 = row.get("result_count");
        let response_time_ms: i64 = row.get("response_time_ms");

        Ok(SearchQueryLogEntry::new(id, row.get::<String, _>("query"))
            .with_user_id(row.get("user_id"))
            .with_filters(filters)
            .with_result_count(result_count.max(0) as u64)
            .with_response_time_ms(response_time_ms.max(0) as u64)
            .with_cache_hit(row.get("cache_hit"))
            .with_created_at(row.get("created_at")))
    }
}

#[async_trait]
impl QueryLogRepository for PostgresQueryLogRepository {
    async fn append(&self, entry: SearchQueryLogEntry) -> Result<(), DomainError> {
        let filters = entry
            .filters
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| {
                DomainError::telemetry(format!("Failed to serialize query filters: {}", e))
            })?;

        let query = format!(
            r#"
            INSERT INTO {} (id, user_id, query, filters, result_count, response_time_ms, cache_hit, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(entry.id().as_str())
            .bind(entry.user_id.as_deref())
            .bind(&entry.query)
            .bind(filters)
            .bind(entry.result_count as i64)
            .bind(entry.response_time_ms as i64)
            .bind(entry.cache_hit)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::telemetry(format!("Failed to append query log: {}", e)))?;

        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchQueryLogEntry>, DomainError> {
        let query = format!(
            r#"
            SELECT id, user_id, query, filters, result_count, response_time_ms, cache_hit, created_at
            FROM {}
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
            self.table_name
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::telemetry(format!("Failed to query recent searches: {}", e)))?;

        rows.iter().map(Self::row_to_entry).collect()
    }
}
