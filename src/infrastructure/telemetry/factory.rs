//! Query log repository factory

use std::sync::Arc;

use sqlx::postgres::PgPool;

use crate::config::TelemetrySettings;
use crate::domain::telemetry::QueryLogRepository;
use crate::domain::DomainError;

use super::in_memory::InMemoryQueryLogRepository;
use super::postgres::PostgresQueryLogRepository;

/// Supported query log backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryLogBackend {
    #[default]
    InMemory,
    Postgres,
}

impl std::fmt::Display for QueryLogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryLogBackend::InMemory => write!(f, "in_memory"),
            QueryLogBackend::Postgres => write!(f, "postgres"),
        }
    }
}

impl std::str::FromStr for QueryLogBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(QueryLogBackend::InMemory),
            "postgres" | "postgresql" => Ok(QueryLogBackend::Postgres),
            _ => Err(DomainError::configuration(format!(
                "Unknown query log backend: {}. Valid backends: in_memory, postgres",
                s
            ))),
        }
    }
}

/// Creates the query log repository selected by `settings`
pub async fn create_query_log_repository(
    settings: &TelemetrySettings,
    pool: Option<&PgPool>,
) -> Result<Arc<dyn QueryLogRepository>, DomainError> {
    let backend: QueryLogBackend = settings.backend.parse()?;

    match backend {
        QueryLogBackend::InMemory => Ok(Arc::new(InMemoryQueryLogRepository::new(
            settings.max_records,
        ))),
        QueryLogBackend::Postgres => {
            let pool = pool.ok_or_else(|| {
                DomainError::configuration("A database connection is required for the postgres query log backend")
            })?;

            let repository = PostgresQueryLogRepository::new(pool.clone());
            repository.ensure_table().await?;
            Ok(Arc::new(repository))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("memory".parse::<QueryLogBackend>().unwrap(), QueryLogBackend::InMemory);
        assert_eq!("Postgres".parse::<QueryLogBackend>().unwrap(), QueryLogBackend::Postgres);
        assert!("redis".parse::<QueryLogBackend>().is_err());
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let repository = create_query_log_repository(&TelemetrySettings::default(), None)
            .await
            .unwrap();

        assert!(repository.recent_for_user("u1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_postgres_without_pool() {
        let settings = TelemetrySettings {
            backend: "postgres".to_string(),
            ..Default::default()
        };

        let result = create_query_log_repository(&settings, None).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
