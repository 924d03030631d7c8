//! Cache repository factory for runtime backend selection

use std::sync::Arc;

use sqlx::postgres::PgPool;

use crate::config::CacheSettings;
use crate::domain::cache::CacheRepository;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCacheConfig, InMemoryCacheRepository};
use super::postgres::PostgresCacheRepository;
use super::redis::{RedisCacheConfig, RedisCacheRepository};

/// Supported cache backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheBackend {
    /// Process-local cache using moka
    #[default]
    InMemory,
    /// PostgreSQL table
    Postgres,
    /// Redis
    Redis,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::InMemory => write!(f, "in_memory"),
            CacheBackend::Postgres => write!(f, "postgres"),
            CacheBackend::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheBackend::InMemory),
            "postgres" | "postgresql" => Ok(CacheBackend::Postgres),
            "redis" => Ok(CacheBackend::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache backend: {}. Valid backends: in_memory, postgres, redis",
                s
            ))),
        }
    }
}

/// Factory for creating cache repositories
#[derive(Debug, Default)]
pub struct CacheRepositoryFactory;

impl CacheRepositoryFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the repository selected by `settings`
    ///
    /// `pool` is required for the Postgres backend and ignored otherwise.
    pub async fn create(
        &self,
        settings: &CacheSettings,
        pool: Option<&PgPool>,
    ) -> Result<Arc<dyn CacheRepository>, DomainError> {
        let backend: CacheBackend = settings.backend.parse()?;

        match backend {
            CacheBackend::InMemory => {
                let config =
                    InMemoryCacheConfig::default().with_max_capacity(settings.max_capacity);
                Ok(Arc::new(InMemoryCacheRepository::with_config(config)))
            }
            CacheBackend::Postgres => {
                let pool = pool.ok_or_else(|| {
                    DomainError::configuration("A database connection is required for the postgres cache backend")
                })?;

                let repository = PostgresCacheRepository::new(pool.clone());
                repository.ensure_table().await?;
                Ok(Arc::new(repository))
            }
            CacheBackend::Redis => {
                let url = settings.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for the redis cache backend")
                })?;

                let config = RedisCacheConfig::new(url).with_key_prefix(settings.key_prefix.clone());
                Ok(Arc::new(RedisCacheRepository::new(config).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheKey;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("in_memory".parse::<CacheBackend>().unwrap(), CacheBackend::InMemory);
        assert_eq!("memory".parse::<CacheBackend>().unwrap(), CacheBackend::InMemory);
        assert_eq!("postgresql".parse::<CacheBackend>().unwrap(), CacheBackend::Postgres);
        assert_eq!("REDIS".parse::<CacheBackend>().unwrap(), CacheBackend::Redis);
        assert!("memcached".parse::<CacheBackend>().is_err());
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(CacheBackend::InMemory.to_string(), "in_memory");
        assert_eq!(CacheBackend::Postgres.to_string(), "postgres");
        assert_eq!(CacheBackend::Redis.to_string(), "redis");
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let factory = CacheRepositoryFactory::new();
        let repository = factory
            .create(&CacheSettings::default(), None)
            .await
            .unwrap();

        assert!(repository.list().await.unwrap().is_empty());
        assert!(repository.get(&CacheKey::new("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_postgres_without_pool() {
        let factory = CacheRepositoryFactory::new();
        let settings = CacheSettings {
            backend: "postgres".to_string(),
            ..Default::default()
        };

        let result = factory.create(&settings, None).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_create_redis_without_url() {
        let factory = CacheRepositoryFactory::new();
        let settings = CacheSettings {
            backend: "redis".to_string(),
            redis_url: None,
            ..Default::default()
        };

        let result = factory.create(&settings, None).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
