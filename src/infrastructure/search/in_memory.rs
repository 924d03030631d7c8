//! In-memory decision record store

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::search::{
    DecisionRecord, NormalizedSearch, SearchExecutor, SearchFilters, SearchPage,
};
use crate::domain::DomainError;

/// Decision records held in memory, queried with the record store's
/// matching rules
#[derive(Debug, Default)]
pub struct InMemoryDecisionStore {
    records: RwLock<Vec<DecisionRecord>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DecisionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Loads records from a JSON array file
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::storage(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let records: Vec<DecisionRecord> = serde_json::from_str(&data).map_err(|e| {
            DomainError::validation(format!("Invalid decision records in {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), count = records.len(), "Loaded decision records");
        Ok(Self::with_records(records))
    }

    pub fn insert(&self, record: DecisionRecord) -> Result<(), DomainError> {
        self.records
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?
            .push(record);
        Ok(())
    }

    fn matches_text(record: &DecisionRecord, text: &str) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(text);

        contains(record.title.as_str())
            || record.description.as_deref().is_some_and(contains)
            || record.area.as_deref().is_some_and(contains)
    }

    fn matches_filters(record: &DecisionRecord, filters: &SearchFilters) -> bool {
        if let Some(status) = filters.status {
            if record.status != status {
                return false;
            }
        }

        if let Some(ref project_id) = filters.project_id {
            if record.project_id.as_ref() != Some(project_id) {
                return false;
            }
        }

        if let Some(ref assignee_id) = filters.assignee_id {
            if record.assignee_id.as_ref() != Some(assignee_id) {
                return false;
            }
        }

        if let Some(ref range) = filters.date_range {
            if !range.contains(record.created_at.date_naive()) {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl SearchExecutor for InMemoryDecisionStore {
    async fn execute(&self, search: &NormalizedSearch) -> Result<SearchPage, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::query(format!("Failed to acquire read lock: {}", e)))?;

        let mut matching: Vec<&DecisionRecord> = records
            .iter()
            .filter(|r| search.text().is_none_or(|text| Self::matches_text(r, text)))
            .filter(|r| Self::matches_filters(r, &search.filters))
            .collect();

        // Newest first
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_count = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(search.offset as usize)
            .take(search.limit as usize)
            .cloned()
            .collect();

        Ok(SearchPage::new(page, total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::{DateRange, DecisionStatus, SearchRequest};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn store() -> InMemoryDecisionStore {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        InMemoryDecisionStore::with_records(vec![
            DecisionRecord::new("d1", "Kitchen tiles", DecisionStatus::Pending)
                .with_area("Kitchen")
                .with_project("p1")
                .with_created_at(base),
            DecisionRecord::new("d2", "Cabinet hardware", DecisionStatus::Approved)
                .with_description("Brushed brass pulls for the KITCHEN")
                .with_project("p1")
                .with_assignee("u1")
                .with_created_at(base + Duration::days(1)),
            DecisionRecord::new("d3", "Bathroom vanity", DecisionStatus::Pending)
                .with_area("Bathroom")
                .with_project("p2")
                .with_assignee("u1")
                .with_created_at(base + Duration::days(2)),
            DecisionRecord::new("d4", "Kitchen faucet", DecisionStatus::Pending)
                .with_project("p2")
                .with_created_at(base + Duration::days(3)),
        ])
    }

    fn ids(page: &SearchPage) -> Vec<&str> {
        page.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_text_matches_title_description_and_area() {
        let page = store()
            .execute(&SearchRequest::new("Kitchen").normalize())
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["d4", "d2", "d1"]);
        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn test_blank_query_matches_everything() {
        let page = store()
            .execute(&SearchRequest::new("  ").normalize())
            .await
            .unwrap();

        assert_eq!(page.total_count, 4);
    }

    #[tokio::test]
    async fn test_filters_are_exact() {
        let filters = SearchFilters::new()
            .with_status(DecisionStatus::Pending)
            .with_assignee("u1");
        let page = store()
            .execute(&SearchRequest::new("").with_filters(filters).normalize())
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["d3"]);
    }

    #[tokio::test]
    async fn test_date_range_filter() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 2),
            NaiveDate::from_ymd_opt(2024, 3, 3),
        );
        let page = store()
            .execute(
                &SearchRequest::new("")
                    .with_filters(SearchFilters::new().with_date_range(range))
                    .normalize(),
            )
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["d3", "d2"]);
    }

    #[tokio::test]
    async fn test_pagination_keeps_total() {
        let page = store()
            .execute(
                &SearchRequest::new("kitchen")
                    .with_limit(1)
                    .with_offset(1)
                    .normalize(),
            )
            .await
            .unwrap();

        assert_eq!(ids(&page), vec!["d2"]);
        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"[{"id":"d1","title":"Deck stain","status":"deferred","created_at":"2024-05-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let store = InMemoryDecisionStore::from_json_file(file.path()).await.unwrap();
        let page = store
            .execute(&SearchRequest::new("deck").normalize())
            .await
            .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.records[0].status, DecisionStatus::Deferred);
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let result = InMemoryDecisionStore::from_json_file("/nonexistent/decisions.json").await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
