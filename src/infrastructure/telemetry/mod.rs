//! Query log infrastructure implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{create_query_log_repository, QueryLogBackend};
pub use in_memory::InMemoryQueryLogRepository;
pub use postgres::{PostgresQueryLogRepository, DEFAULT_QUERY_LOG_TABLE};
