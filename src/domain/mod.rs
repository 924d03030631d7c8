//! Domain layer - Search caching types and collaborator contracts

pub mod cache;
pub mod clock;
pub mod error;
pub mod identity;
pub mod search;
pub mod telemetry;

pub use cache::{CacheEntry, CacheKey, CacheRepository, CacheStats, KeyHashWidth, SearchKeyDeriver};
pub use clock::{Clock, SystemClock};
pub use error::DomainError;
pub use identity::{AnonymousIdentity, IdentityResolver, StaticIdentity};
pub use search::{
    DecisionRecord, DecisionStatus, NormalizedSearch, SearchExecutor, SearchFilters, SearchRequest,
    SearchResult,
};
pub use telemetry::{QueryLogId, QueryLogRepository, SearchQueryLogEntry};
