//! Cached search orchestration

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::domain::cache::{CacheKey, CacheStats, SearchKeyDeriver};
use crate::domain::search::{SearchExecutor, SearchRequest, SearchResult};
use crate::domain::telemetry::SearchQueryLogEntry;
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_search, record_search_error, CacheOutcome,
};

use super::{CacheStore, QueryTelemetryLogger};

/// Default number of entries returned by [`SearchOrchestrator::recent_queries`]
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Runs searches through the result cache
///
/// Only the record query can fail a search. Cache and telemetry failures
/// degrade to a cache miss or a missing log entry.
#[derive(Debug, Clone)]
pub struct SearchOrchestrator {
    executor: Arc<dyn SearchExecutor>,
    deriver: SearchKeyDeriver,
    store: CacheStore,
    telemetry: QueryTelemetryLogger,
}

impl SearchOrchestrator {
    pub fn new(
        executor: Arc<dyn SearchExecutor>,
        store: CacheStore,
        telemetry: QueryTelemetryLogger,
    ) -> Self {
        Self {
            executor,
            deriver: SearchKeyDeriver::new(),
            store,
            telemetry,
        }
    }

    pub fn with_deriver(mut self, deriver: SearchKeyDeriver) -> Self {
        self.deriver = deriver;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Cache key a request would be stored under
    pub fn cache_key_for(&self, request: &SearchRequest) -> CacheKey {
        self.deriver.derive(request)
    }

    /// Executes a search, serving it from the cache when a live entry exists
    #[instrument(skip(self, request), fields(query = %request.query))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, DomainError> {
        let started = Instant::now();
        let normalized = request.normalize();
        let key = self.deriver.derive_normalized(&normalized);

        if let Some(entry) = self.store.read(&key).await {
            self.store.increment_hit(&key).await;

            let elapsed = started.elapsed();
            let response_time_ms = elapsed.as_millis() as u64;
            let result = SearchResult::from_page(entry.payload, true, response_time_ms);

            self.telemetry
                .log(request, result.result_count(), response_time_ms, true)
                .await;
            record_search(CacheOutcome::Hit, elapsed);

            debug!(cache_key = %key, response_time_ms, "Search served from cache");
            return Ok(result);
        }

        let page = match self.executor.execute(&normalized).await {
            Ok(page) => page,
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Search query failed");
                record_search_error();
                return Err(e);
            }
        };

        let elapsed = started.elapsed();
        let response_time_ms = elapsed.as_millis() as u64;

        let query_log_id = self
            .telemetry
            .log(request, page.records.len(), response_time_ms, false)
            .await;
        self.store.write(&key, page.clone(), query_log_id).await;
        record_search(CacheOutcome::Miss, elapsed);

        debug!(
            cache_key = %key,
            response_time_ms,
            total_count = page.total_count,
            "Search executed and cached"
        );
        Ok(SearchResult::from_page(page, false, response_time_ms))
    }

    /// Clears one cache entry, or sweeps every expired entry when no key is
    /// given; returns the number of entries removed
    pub async fn clear_cache(&self, key: Option<&CacheKey>) -> Result<usize, DomainError> {
        let removed = match key {
            Some(key) => usize::from(self.store.clear_one(key).await?),
            None => self.store.sweep_expired().await?,
        };

        info!(removed, "Cleared search cache");
        Ok(removed)
    }

    pub async fn cache_stats(&self) -> Result<CacheStats, DomainError> {
        self.store.stats().await
    }

    /// Most recent searches of the current caller, newest first
    pub async fn recent_queries(
        &self,
        limit: usize,
    ) -> Result<Vec<SearchQueryLogEntry>, DomainError> {
        self.telemetry.recent(limit).await
    }
}
