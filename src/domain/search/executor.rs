//! Record store query contract

use std::fmt::Debug;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::{NormalizedSearch, SearchPage};
use crate::domain::DomainError;

/// Executes a search against the decision record store
///
/// Implementations apply case-insensitive substring matching of the text
/// predicate over title, description and area, exact equality for each
/// filter field present, and the request's limit/offset. The returned total
/// is counted before pagination.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchExecutor: Send + Sync + Debug {
    async fn execute(&self, search: &NormalizedSearch) -> Result<SearchPage, DomainError>;
}
