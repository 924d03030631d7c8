//! Query log repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::SearchQueryLogEntry;
use crate::domain::DomainError;

/// Repository for search query log entries
#[async_trait]
pub trait QueryLogRepository: Send + Sync + Debug {
    /// Appends an entry
    async fn append(&self, entry: SearchQueryLogEntry) -> Result<(), DomainError>;

    /// Most recent entries for a user, newest first
    async fn recent_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchQueryLogEntry>, DomainError>;
}
