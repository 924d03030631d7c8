//! Search result types

use serde::{Deserialize, Serialize};

use super::DecisionRecord;

/// One page of matching records plus the pre-pagination total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub records: Vec<DecisionRecord>,
    pub total_count: u64,
}

impl SearchPage {
    pub fn new(records: Vec<DecisionRecord>, total_count: u64) -> Self {
        Self {
            records,
            total_count,
        }
    }
}

/// The part of a search result that is persisted in the cache
pub type CachedSearchPayload = SearchPage;

/// Result returned to search callers
///
/// `cache_hit` and `response_time_ms` describe the current call only and are
/// never read back from a cached entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub records: Vec<DecisionRecord>,
    pub total_count: u64,
    pub cache_hit: bool,
    pub response_time_ms: u64,
}

impl SearchResult {
    pub fn from_page(page: SearchPage, cache_hit: bool, response_time_ms: u64) -> Self {
        Self {
            records: page.records,
            total_count: page.total_count,
            cache_hit,
            response_time_ms,
        }
    }

    /// Number of records in this page
    pub fn result_count(&self) -> usize {
        self.records.len()
    }
}
