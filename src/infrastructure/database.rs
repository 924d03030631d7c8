//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseSettings;
use crate::domain::DomainError;

/// Opens a connection pool for the postgres backends
pub async fn connect_pool(settings: &DatabaseSettings) -> Result<PgPool, DomainError> {
    let url = settings.url.as_deref().ok_or_else(|| {
        DomainError::configuration("database.url is required for postgres backends")
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!(max_connections = settings.max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_is_configuration_error() {
        let result = connect_pool(&DatabaseSettings::default()).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
