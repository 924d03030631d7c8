//! Best-effort cache store policy over a cache repository

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::cache::{CacheEntry, CacheKey, CacheRepository, CacheStats};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::search::CachedSearchPayload;
use crate::domain::telemetry::QueryLogId;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_best_effort_failure, record_sweep, BestEffortOp};

/// Default time-to-live for cached search results
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound applied to requested TTLs
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Cache read/write policy layered on a [`CacheRepository`]
///
/// `read`, `write` and `increment_hit` never fail: backend errors are logged
/// and degrade to a miss or a skipped write. The administrative operations
/// surface backend errors.
#[derive(Debug, Clone)]
pub struct CacheStore {
    repository: Arc<dyn CacheRepository>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl CacheStore {
    pub fn new(repository: Arc<dyn CacheRepository>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
            default_ttl: DEFAULT_TTL,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the live entry for `key`, or `None` if it is missing, expired
    /// or the backend failed
    pub async fn read(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.repository.find_live(key, self.clock.now()).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cache read failed, treating as miss");
                record_best_effort_failure(BestEffortOp::CacheRead);
                None
            }
        }
    }

    /// Stores `payload` under `key` with the default TTL
    pub async fn write(
        &self,
        key: &CacheKey,
        payload: CachedSearchPayload,
        query_log_id: Option<QueryLogId>,
    ) {
        self.write_with_ttl(key, payload, query_log_id, self.default_ttl)
            .await
    }

    /// Stores `payload` under `key`, replacing any existing entry and
    /// resetting its hit count
    pub async fn write_with_ttl(
        &self,
        key: &CacheKey,
        payload: CachedSearchPayload,
        query_log_id: Option<QueryLogId>,
        ttl: Duration,
    ) {
        let ttl = chrono::Duration::from_std(ttl.min(MAX_TTL)).unwrap_or(chrono::Duration::zero());
        let entry = CacheEntry::new(key.clone(), payload, self.clock.now(), ttl)
            .with_query_log_id(query_log_id);

        match self.repository.upsert(entry).await {
            Ok(()) => debug!(cache_key = %key, "Cached search result"),
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cache write failed, result not cached");
                record_best_effort_failure(BestEffortOp::CacheWrite);
            }
        }
    }

    /// Adds one to the entry's hit counter
    pub async fn increment_hit(&self, key: &CacheKey) {
        match self.repository.increment_hits(key).await {
            Ok(Some(count)) => debug!(cache_key = %key, hit_count = count, "Recorded cache hit"),
            Ok(None) => debug!(cache_key = %key, "Cache entry vanished before hit was recorded"),
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Hit count increment failed");
                record_best_effort_failure(BestEffortOp::HitIncrement);
            }
        }
    }

    /// Deletes every entry already past expiry
    pub async fn sweep_expired(&self) -> Result<usize, DomainError> {
        let deleted = self.repository.delete_expired(self.clock.now()).await?;
        record_sweep(deleted);
        debug!(deleted, "Swept expired cache entries");
        Ok(deleted)
    }

    /// Deletes the entry at `key`, if present
    pub async fn clear_one(&self, key: &CacheKey) -> Result<bool, DomainError> {
        let deleted = self.repository.delete(key).await?;
        debug!(cache_key = %key, deleted, "Cleared cache entry");
        Ok(deleted)
    }

    /// Scans all persisted entries
    pub async fn stats(&self) -> Result<CacheStats, DomainError> {
        let entries = self.repository.list().await?;
        Ok(CacheStats::from_entries(&entries, self.clock.now()))
    }
}
