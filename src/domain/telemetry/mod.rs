//! Search telemetry domain
//!
//! Every orchestrated search appends one query log entry. Entries are never
//! updated or deleted by the search subsystem.

mod record;
mod repository;

pub use record::{QueryLogId, SearchQueryLogEntry};
pub use repository::QueryLogRepository;

#[cfg(test)]
pub use repository::mock::MockQueryLogRepository;
