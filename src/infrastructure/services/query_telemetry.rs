//! Search query telemetry logger

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::identity::{AnonymousIdentity, IdentityResolver};
use crate::domain::search::SearchRequest;
use crate::domain::telemetry::{QueryLogId, QueryLogRepository, SearchQueryLogEntry};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_best_effort_failure, BestEffortOp};

/// Appends one query log entry per search
///
/// Logging never fails the caller. An identity lookup failure logs the
/// search as a guest; a repository failure drops the entry.
#[derive(Debug, Clone)]
pub struct QueryTelemetryLogger {
    repository: Arc<dyn QueryLogRepository>,
    identity: Arc<dyn IdentityResolver>,
    clock: Arc<dyn Clock>,
    enabled: bool,
}

impl QueryTelemetryLogger {
    pub fn new(repository: Arc<dyn QueryLogRepository>) -> Self {
        Self {
            repository,
            identity: Arc::new(AnonymousIdentity),
            clock: Arc::new(SystemClock),
            enabled: true,
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn current_user(&self) -> Option<String> {
        match self.identity.current_user().await {
            Ok(user) => user,
            Err(e) => {
                debug!(error = %e, "Identity lookup failed, logging search as guest");
                None
            }
        }
    }

    /// Records a search, returning the new entry's ID or `None` when the
    /// entry was not persisted
    pub async fn log(
        &self,
        request: &SearchRequest,
        result_count: usize,
        response_time_ms: u64,
        cache_hit: bool,
    ) -> Option<QueryLogId> {
        if !self.enabled {
            return None;
        }

        let entry = SearchQueryLogEntry::new(QueryLogId::generate(), request.query.clone())
            .with_user_id(self.current_user().await)
            .with_filters(request.filters.clone())
            .with_result_count(result_count as u64)
            .with_response_time_ms(response_time_ms)
            .with_cache_hit(cache_hit)
            .with_created_at(self.clock.now());
        let id = entry.id().clone();

        match self.repository.append(entry).await {
            Ok(()) => {
                debug!(query_log_id = %id, cache_hit, "Logged search query");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to log search query");
                record_best_effort_failure(BestEffortOp::Telemetry);
                None
            }
        }
    }

    /// Most recent searches of the current user, newest first; guests have
    /// no history
    pub async fn recent(&self, limit: usize) -> Result<Vec<SearchQueryLogEntry>, DomainError> {
        match self.current_user().await {
            Some(user_id) => self.repository.recent_for_user(&user_id, limit).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::{MockIdentityResolver, StaticIdentity};
    use crate::domain::search::{DecisionStatus, SearchFilters};
    use crate::domain::telemetry::MockQueryLogRepository;

    #[tokio::test]
    async fn test_log_records_raw_request() {
        let repository = Arc::new(MockQueryLogRepository::new());
        let logger = QueryTelemetryLogger::new(repository.clone())
            .with_identity(Arc::new(StaticIdentity::new("user-1")));

        let request = SearchRequest::new("  Kitchen ")
            .with_filters(SearchFilters::new().with_status(DecisionStatus::Pending));
        let id = logger.log(&request, 3, 42, false).await.unwrap();

        let entries = repository.entries();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.id(), &id);
        assert_eq!(entry.query, "  Kitchen ");
        assert_eq!(entry.user_id.as_deref(), Some("user-1"));
        assert_eq!(entry.result_count, 3);
        assert_eq!(entry.response_time_ms, 42);
        assert!(!entry.cache_hit);
        assert_eq!(
            entry.filters.as_ref().and_then(|f| f.status),
            Some(DecisionStatus::Pending)
        );
    }

    #[tokio::test]
    async fn test_identity_failure_logs_as_guest() {
        let mut identity = MockIdentityResolver::new();
        identity
            .expect_current_user()
            .returning(|| Err(DomainError::internal("session store down")));

        let repository = Arc::new(MockQueryLogRepository::new());
        let logger =
            QueryTelemetryLogger::new(repository.clone()).with_identity(Arc::new(identity));

        assert!(logger.log(&SearchRequest::new("tile"), 0, 1, true).await.is_some());
        assert_eq!(repository.entries()[0].user_id, None);
    }

    #[tokio::test]
    async fn test_repository_failure_returns_none() {
        let repository = Arc::new(MockQueryLogRepository::new().with_error("disk full"));
        let logger = QueryTelemetryLogger::new(repository);

        assert!(logger.log(&SearchRequest::new("tile"), 0, 1, false).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_logger_skips_append() {
        let repository = Arc::new(MockQueryLogRepository::new());
        let logger = QueryTelemetryLogger::new(repository.clone()).with_enabled(false);

        assert!(logger.log(&SearchRequest::new("tile"), 0, 1, false).await.is_none());
        assert!(repository.entries().is_empty());
    }

    #[tokio::test]
    async fn test_recent_for_user_and_guest() {
        let repository = Arc::new(MockQueryLogRepository::new());
        let user_logger = QueryTelemetryLogger::new(repository.clone())
            .with_identity(Arc::new(StaticIdentity::new("user-1")));
        let guest_logger = QueryTelemetryLogger::new(repository.clone());

        user_logger.log(&SearchRequest::new("a"), 0, 1, false).await;
        guest_logger.log(&SearchRequest::new("b"), 0, 1, false).await;

        let recent = user_logger.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].query, "a");

        assert!(guest_logger.recent(10).await.unwrap().is_empty());
    }
}
