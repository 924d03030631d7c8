//! In-memory query log repository

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::telemetry::{QueryLogRepository, SearchQueryLogEntry};
use crate::domain::DomainError;

/// In-memory query log, dropping the oldest entries past `max_records`
#[derive(Debug)]
pub struct InMemoryQueryLogRepository {
    entries: RwLock<VecDeque<SearchQueryLogEntry>>,
    max_records: usize,
}

impl InMemoryQueryLogRepository {
    pub fn new(max_records: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_records,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryQueryLogRepository {
    fn default() -> Self {
        Self::new(100_000)
    }
}

#[async_trait]
impl QueryLogRepository for InMemoryQueryLogRepository {
    async fn append(&self, entry: SearchQueryLogEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.push_back(entry);

        while entries.len() > self.max_records {
            entries.pop_front();
        }

        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchQueryLogEntry>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut results: Vec<_> = entries
            .iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();

        // Stable sort keeps append order among equal timestamps, so reverse
        // first to put later appends ahead
        results.reverse();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results.truncate(limit);

        Ok(results)
    }
}
