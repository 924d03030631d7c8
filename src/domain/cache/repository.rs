//! Cache persistence trait

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CacheEntry, CacheKey};
use crate::domain::DomainError;

/// Persistent key to entry mapping backing the search cache
///
/// Writes are upserts keyed by cache key, so at most one entry exists per
/// key. Expiry is lazy: expired entries stay persisted until
/// `delete_expired` removes them, but `find_live` never returns them.
#[async_trait]
pub trait CacheRepository: Send + Sync + Debug {
    /// Gets the entry for a key regardless of expiry
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, DomainError>;

    /// Gets the entry for a key if it expires strictly after `now`
    async fn find_live(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, DomainError> {
        Ok(self.get(key).await?.filter(|entry| entry.is_live_at(now)))
    }

    /// Inserts the entry, fully replacing any entry with the same key
    async fn upsert(&self, entry: CacheEntry) -> Result<(), DomainError>;

    /// Adds one to the hit counter of the entry at `key`, returning the new
    /// count or `None` when no entry exists
    ///
    /// The default reads the current count and writes it back incremented.
    /// Concurrent increments may be lost; backends with an atomic primitive
    /// override this.
    async fn increment_hits(&self, key: &CacheKey) -> Result<Option<u64>, DomainError> {
        match self.get(key).await? {
            Some(mut entry) => {
                entry.hit_count += 1;
                let count = entry.hit_count;
                self.upsert(entry).await?;
                Ok(Some(count))
            }
            None => Ok(None),
        }
    }

    /// Deletes the entry at `key`, returning true if one existed
    async fn delete(&self, key: &CacheKey) -> Result<bool, DomainError>;

    /// Deletes every entry expiring at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Lists every persisted entry, expired ones included
    async fn list(&self) -> Result<Vec<CacheEntry>, DomainError>;
}
