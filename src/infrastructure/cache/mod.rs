//! Cache infrastructure - Cache repository implementations

mod factory;
mod in_memory;
mod postgres;
mod redis;

pub use factory::{CacheBackend, CacheRepositoryFactory};
pub use in_memory::{InMemoryCacheConfig, InMemoryCacheRepository};
pub use postgres::{PostgresCacheRepository, DEFAULT_CACHE_TABLE};
pub use self::redis::{RedisCacheConfig, RedisCacheRepository};
