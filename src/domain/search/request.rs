//! Search request types and normalization

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DecisionStatus;

/// Default page size when none is given
pub const DEFAULT_LIMIT: u32 = 10;

/// Default offset when none is given
pub const DEFAULT_OFFSET: u32 = 0;

/// Inclusive range over a record's creation date
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Checks whether a date falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.from {
            if date < from {
                return false;
            }
        }

        if let Some(to) = self.to {
            if date > to {
                return false;
            }
        }

        true
    }
}

/// Closed set of filters a search can apply
///
/// Field order is significant: it is the order used when the filters are
/// serialized into the canonical cache key input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DecisionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: DecisionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_assignee(mut self, assignee_id: impl Into<String>) -> Self {
        self.assignee_id = Some(assignee_id.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.project_id.is_none()
            && self.assignee_id.is_none()
            && self.date_range.is_none()
    }
}

/// A search as submitted by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl SearchRequest {
    /// Creates a request for the given free-text query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Applies the caching normalization rules: trimmed lower-case query,
    /// empty filters when absent, default limit and offset
    pub fn normalize(&self) -> NormalizedSearch {
        NormalizedSearch {
            query: self.query.trim().to_lowercase(),
            filters: self.filters.clone().unwrap_or_default(),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
            offset: self.offset.unwrap_or(DEFAULT_OFFSET),
        }
    }
}

/// Normalized form of a request; two requests are cache-equivalent iff
/// their normalized forms are equal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedSearch {
    pub query: String,
    pub filters: SearchFilters,
    pub limit: u32,
    pub offset: u32,
}

impl NormalizedSearch {
    /// Stable string form fed to the key hash
    pub fn canonical(&self) -> String {
        // Plain structs of strings, integers and dates always serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Text predicate for the record query, `None` when the query is blank
    pub fn text(&self) -> Option<&str> {
        if self.query.is_empty() {
            None
        } else {
            Some(&self.query)
        }
    }
}
