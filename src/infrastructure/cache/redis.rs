//! Redis cache repository

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::{CacheEntry, CacheKey, CacheRepository};
use crate::domain::DomainError;

/// Deletes an entry only while its stored JSON still equals `ARGV[1]`
///
/// KEYS: entry, hits, index. ARGV: expected entry JSON, cache key.
const REMOVE_IF_UNCHANGED: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('DEL', KEYS[1], KEYS[2])
    redis.call('SREM', KEYS[3], ARGV[2])
    return 1
end
return 0
";

fn decode_entry(data: &str) -> Result<CacheEntry, DomainError> {
    serde_json::from_str(data)
        .map_err(|e| DomainError::cache(format!("Failed to deserialize cache entry: {}", e)))
}

/// Configuration for the Redis cache repository
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: String,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "decision-search".to_string(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Cache repository backed by Redis
///
/// Layout per cache key:
/// - `{prefix}:entry:{key}` holds the entry as JSON (its `hit_count` is ignored)
/// - `{prefix}:hits:{key}` holds the hit counter, bumped with `INCR`
/// - `{prefix}:keys` is a set indexing every stored key
///
/// Redis-native expiry is not used; expired entries stay until swept.
#[derive(Clone)]
pub struct RedisCacheRepository {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCacheRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheRepository")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCacheRepository {
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| DomainError::cache("Timed out connecting to Redis"))?
        .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn entry_key(&self, key: &str) -> String {
        format!("{}:entry:{}", self.config.key_prefix, key)
    }

    fn hits_key(&self, key: &str) -> String {
        format!("{}:hits:{}", self.config.key_prefix, key)
    }

    fn index_key(&self) -> String {
        format!("{}:keys", self.config.key_prefix)
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, DomainError> {
        let mut conn = self.connection.clone();

        let (data, hits): (Option<String>, Option<u64>) = redis::pipe()
            .get(self.entry_key(key))
            .get(self.hits_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))?;

        match data {
            Some(data) => {
                let mut entry = decode_entry(&data)?;
                entry.hit_count = hits.unwrap_or(0);
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let (removed, _, _): (u64, u64, u64) = redis::pipe()
            .atomic()
            .del(self.entry_key(key))
            .del(self.hits_key(key))
            .srem(self.index_key(), key)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(removed > 0)
    }

    async fn indexed_keys(&self) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection.clone();

        conn.smembers(self.index_key())
            .await
            .map_err(|e| DomainError::cache(format!("Failed to list cache keys: {}", e)))
    }

    /// Removes the entry at `key` if the stored entry is expired at `now`
    ///
    /// The delete runs only if the entry JSON is unchanged since it was read,
    /// so an upsert racing the sweep is kept.
    async fn remove_if_expired(&self, key: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let data: Option<String> = conn
            .get(self.entry_key(key))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))?;

        let Some(data) = data else {
            return Ok(false);
        };

        if !decode_entry(&data)?.is_expired_at(now) {
            return Ok(false);
        }

        let script = redis::Script::new(REMOVE_IF_UNCHANGED);
        let mut invocation = script.prepare_invoke();
        invocation
            .key(self.entry_key(key))
            .key(self.hits_key(key))
            .key(self.index_key())
            .arg(data)
            .arg(key);

        let removed: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(removed == 1)
    }
}

#[async_trait]
impl CacheRepository for RedisCacheRepository {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, DomainError> {
        self.load(key.as_str()).await
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), DomainError> {
        let key = entry.key.as_str().to_string();
        let data = serde_json::to_string(&entry).map_err(|e| {
            DomainError::cache(format!("Failed to serialize cache entry: {}", e))
        })?;
        let mut conn = self.connection.clone();

        let _: () = redis::pipe()
            .atomic()
            .set(self.entry_key(&key), data)
            .ignore()
            .set(self.hits_key(&key), entry.hit_count)
            .ignore()
            .sadd(self.index_key(), &key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn increment_hits(&self, key: &CacheKey) -> Result<Option<u64>, DomainError> {
        let mut conn = self.connection.clone();

        let exists: bool = conn
            .exists(self.entry_key(key.as_str()))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to check key '{}': {}", key, e)))?;

        if !exists {
            return Ok(None);
        }

        let count: u64 = conn
            .incr(self.hits_key(key.as_str()), 1u64)
            .await
            .map_err(|e| {
                DomainError::cache(format!("Failed to increment hits for '{}': {}", key, e))
            })?;

        Ok(Some(count))
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, DomainError> {
        self.remove(key.as_str()).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut deleted = 0;

        for key in self.indexed_keys().await? {
            if self.remove_if_expired(&key, now).await? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn list(&self) -> Result<Vec<CacheEntry>, DomainError> {
        let keys = self.indexed_keys().await?;
        let mut entries = Vec::with_capacity(keys.len());

        for key in keys {
            if let Some(entry) = self.load(&key).await? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RedisCacheConfig::new("redis://cache:6379")
            .with_key_prefix("decisions")
            .with_connection_timeout(Duration::from_secs(2));

        assert_eq!(config.url, "redis://cache:6379");
        assert_eq!(config.key_prefix, "decisions");
        assert_eq!(config.connection_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_decode_entry() {
        let now = Utc::now();
        let entry = CacheEntry::new(
            CacheKey::new("search_a"),
            crate::domain::search::CachedSearchPayload::default(),
            now,
            chrono::Duration::minutes(1),
        );
        let data = serde_json::to_string(&entry).unwrap();

        let decoded = decode_entry(&data).unwrap();
        assert!(!decoded.is_expired_at(now));
        assert!(decoded.is_expired_at(now + chrono::Duration::minutes(1)));

        assert!(matches!(decode_entry("{"), Err(DomainError::Cache { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url_is_cache_error() {
        let result = RedisCacheRepository::new(RedisCacheConfig::new("not-a-url")).await;

        assert!(matches!(result, Err(DomainError::Cache { .. })));
    }
}
