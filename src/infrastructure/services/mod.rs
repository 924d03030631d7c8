//! Search caching services

mod cache_store;
mod query_telemetry;
mod search_orchestrator;

pub use cache_store::{CacheStore, DEFAULT_TTL};
pub use query_telemetry::QueryTelemetryLogger;
pub use search_orchestrator::{SearchOrchestrator, DEFAULT_RECENT_LIMIT};
