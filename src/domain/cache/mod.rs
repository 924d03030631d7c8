//! Cache domain - key derivation, entries and the persistence contract

mod entry;
mod key;
mod repository;
mod stats;

pub use entry::CacheEntry;
pub use key::{CacheKey, KeyHashWidth, SearchKeyDeriver, DEFAULT_NAMESPACE};
pub use repository::CacheRepository;
pub use stats::CacheStats;

#[cfg(test)]
pub use repository::mock::{CacheOp, MockCacheRepository};
