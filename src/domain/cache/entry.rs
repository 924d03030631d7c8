//! Persisted cache entries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::CacheKey;
use crate::domain::search::CachedSearchPayload;
use crate::domain::telemetry::QueryLogId;

/// A cached search result with its expiry and popularity counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: CachedSearchPayload,
    /// Query log row that produced this result, when known
    #[serde(default)]
    pub query_log_id: Option<QueryLogId>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub hit_count: u64,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates a fresh entry expiring `ttl` after `now`, with zero hits
    pub fn new(
        key: CacheKey,
        payload: CachedSearchPayload,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            key,
            payload,
            query_log_id: None,
            expires_at: now + ttl,
            hit_count: 0,
            created_at: now,
        }
    }

    pub fn with_query_log_id(mut self, id: Option<QueryLogId>) -> Self {
        self.query_log_id = id;
        self
    }

    /// Live entries expire strictly after `now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_live_at(now)
    }
}
