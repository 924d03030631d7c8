//! Decision Search Cache
//!
//! A read-through cache for decision record searches with:
//! - Deterministic cache keys derived from normalized search requests
//! - Lazily expiring cache entries with hit counting
//! - Per-search query telemetry
//! - In-memory, PostgreSQL and Redis backends

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use domain::{IdentityResolver, QueryLogRepository, SearchExecutor, SearchKeyDeriver};
use infrastructure::{
    cache::CacheRepositoryFactory,
    database::connect_pool,
    services::{CacheStore, QueryTelemetryLogger, SearchOrchestrator},
    telemetry::{create_query_log_repository, InMemoryQueryLogRepository},
};

/// Create a search orchestrator with default configuration
pub async fn create_orchestrator(
    executor: Arc<dyn SearchExecutor>,
    identity: Arc<dyn IdentityResolver>,
) -> anyhow::Result<SearchOrchestrator> {
    create_orchestrator_with_config(&AppConfig::default(), executor, identity).await
}

/// Create a search orchestrator wired to the backends named in `config`
pub async fn create_orchestrator_with_config(
    config: &AppConfig,
    executor: Arc<dyn SearchExecutor>,
    identity: Arc<dyn IdentityResolver>,
) -> anyhow::Result<SearchOrchestrator> {
    let pool = if config.requires_database() {
        Some(connect_pool(&config.database).await?)
    } else {
        None
    };

    let cache_repository = CacheRepositoryFactory::new()
        .create(&config.cache, pool.as_ref())
        .await?;
    let store = CacheStore::new(cache_repository).with_default_ttl(config.cache.ttl());

    let query_log: Arc<dyn QueryLogRepository> = if config.telemetry.enabled {
        create_query_log_repository(&config.telemetry, pool.as_ref()).await?
    } else {
        Arc::new(InMemoryQueryLogRepository::new(0))
    };
    let telemetry = QueryTelemetryLogger::new(query_log)
        .with_identity(identity)
        .with_enabled(config.telemetry.enabled);

    let deriver = SearchKeyDeriver::new()
        .with_namespace(config.cache.namespace.clone())
        .with_width(config.cache.key_width);

    info!(
        cache_backend = %config.cache.backend,
        telemetry_backend = %config.telemetry.backend,
        telemetry_enabled = config.telemetry.enabled,
        key_width = %config.cache.key_width,
        "Search orchestrator initialized"
    );

    Ok(SearchOrchestrator::new(executor, store, telemetry).with_deriver(deriver))
}
