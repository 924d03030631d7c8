//! Search domain - requests, records and the record store contract

mod executor;
mod record;
mod request;
mod result;

pub use executor::SearchExecutor;
pub use record::{DecisionRecord, DecisionStatus};
pub use request::{
    DateRange, NormalizedSearch, SearchFilters, SearchRequest, DEFAULT_LIMIT, DEFAULT_OFFSET,
};
pub use result::{CachedSearchPayload, SearchPage, SearchResult};

#[cfg(test)]
pub use executor::MockSearchExecutor;
