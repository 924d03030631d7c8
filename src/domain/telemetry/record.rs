//! Search query log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::search::SearchFilters;

/// Unique identifier for a query log entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryLogId(String);

impl QueryLogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique ID
    pub fn generate() -> Self {
        Self(format!("qlog-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for QueryLogId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for QueryLogId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for QueryLogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only record of one search invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQueryLogEntry {
    id: QueryLogId,
    /// Caller identity, `None` for guests
    pub user_id: Option<String>,
    /// Query text as submitted, before normalization
    pub query: String,
    /// Filters as submitted
    pub filters: Option<SearchFilters>,
    pub result_count: u64,
    pub response_time_ms: u64,
    pub cache_hit: bool,
    pub created_at: DateTime<Utc>,
}

impl SearchQueryLogEntry {
    pub fn new(id: impl Into<QueryLogId>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            query: query.into(),
            filters: None,
            result_count: 0,
            response_time_ms: 0,
            cache_hit: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_filters(mut self, filters: Option<SearchFilters>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_result_count(mut self, count: u64) -> Self {
        self.result_count = count;
        self
    }

    pub fn with_response_time_ms(mut self, ms: u64) -> Self {
        self.response_time_ms = ms;
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> &QueryLogId {
        &self.id
    }
}
