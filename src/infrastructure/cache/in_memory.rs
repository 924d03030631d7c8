//! In-memory cache repository using moka

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use moka::ops::compute::{CompResult, Op};

use crate::domain::cache::{CacheEntry, CacheKey, CacheRepository};
use crate::domain::DomainError;

/// Configuration for the in-memory cache repository
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries before moka starts evicting
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Process-local cache repository
///
/// Moka only bounds the entry count here. No time-based eviction is
/// configured, so expired entries remain visible to stats until swept.
#[derive(Debug)]
pub struct InMemoryCacheRepository {
    cache: MokaCache<CacheKey, CacheEntry>,
    config: InMemoryCacheConfig,
}

impl InMemoryCacheRepository {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .build();

        Self { cache, config }
    }

    pub fn config(&self) -> &InMemoryCacheConfig {
        &self.config
    }

    /// Removes the entry at `key` only if the stored entry is still expired
    /// at `now`, so an entry replaced after a snapshot survives
    async fn remove_if_expired(&self, key: &CacheKey, now: DateTime<Utc>) -> bool {
        let result = self
            .cache
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(current) if current.value().is_expired_at(now) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        matches!(result, CompResult::Removed(_))
    }

    async fn snapshot(&self) -> Vec<CacheEntry> {
        self.cache.run_pending_tasks().await;
        self.cache.iter().map(|(_, entry)| entry).collect()
    }
}

impl Default for InMemoryCacheRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheRepository for InMemoryCacheRepository {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, DomainError> {
        Ok(self.cache.get(key).await)
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), DomainError> {
        self.cache.insert(entry.key.clone(), entry).await;
        Ok(())
    }

    async fn increment_hits(&self, key: &CacheKey) -> Result<Option<u64>, DomainError> {
        let result = self
            .cache
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(current) => {
                        let mut entry = current.into_value();
                        entry.hit_count += 1;
                        Op::Put(entry)
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        match result {
            CompResult::ReplacedWith(entry) | CompResult::Inserted(entry) => {
                Ok(Some(entry.into_value().hit_count))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let expired: Vec<CacheKey> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key)
            .collect();

        let mut deleted = 0;

        for key in expired {
            if self.remove_if_expired(&key, now).await {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn list(&self) -> Result<Vec<CacheEntry>, DomainError> {
        Ok(self.snapshot().await)
    }
}
