use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use super::{
    memory::MemoryCache,
    r#trait::{CacheResult, CacheTrait},
    redis_cache::RedisCache,
};
use crate::config::{CacheBackendKind, MemoryConfig};

/// Represents the configured cache backend
pub enum CacheBackend<T> {
    /// Redis backend using a deadpool connection pool
    Redis(RedisCache<T>),

    /// In-memory cache backend
    Memory(MemoryCache<T>),
}

impl<T> CacheBackend<T> {
    pub fn redis(pool: deadpool_redis::Pool) -> Self {
        CacheBackend::Redis(RedisCache::new(pool))
    }

    pub fn memory(config: MemoryConfig) -> Self {
        CacheBackend::Memory(MemoryCache::new(config))
    }

    /// Pick a backend by kind. A redis kind without a pool falls back to
    /// the in-process cache.
    pub fn from_kind(
        kind: CacheBackendKind, pool: Option<deadpool_redis::Pool>,
        memory: MemoryConfig,
    ) -> Self {
        match (kind, pool) {
            (CacheBackendKind::Redis, Some(pool)) => Self::redis(pool),
            _ => Self::memory(memory),
        }
    }

    pub fn kind(&self) -> CacheBackendKind {
        match self {
            CacheBackend::Redis(_) => CacheBackendKind::Redis,
            CacheBackend::Memory(_) => CacheBackendKind::Memory,
        }
    }

    /// Check if this is a Redis backend
    pub fn is_redis(&self) -> bool { matches!(self, CacheBackend::Redis(_)) }
}

#[async_trait]
impl<T> CacheTrait for CacheBackend<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Value = T;

    async fn try_get(&self, key: &str) -> CacheResult<Option<Self::Value>> {
        match self {
            CacheBackend::Redis(cache) => cache.try_get(key).await,
            CacheBackend::Memory(cache) => cache.try_get(key).await,
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        match self {
            CacheBackend::Redis(cache) => cache.exists(key).await,
            CacheBackend::Memory(cache) => cache.exists(key).await,
        }
    }

    async fn set_with_ttl(
        &self, key: &str, value: &Self::Value, ttl: Duration,
    ) -> CacheResult<()> {
        match self {
            CacheBackend::Redis(cache) => {
                cache.set_with_ttl(key, value, ttl).await
            }
            CacheBackend::Memory(cache) => {
                cache.set_with_ttl(key, value, ttl).await
            }
        }
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        match self {
            CacheBackend::Redis(cache) => cache.remove(key).await,
            CacheBackend::Memory(cache) => cache.remove(key).await,
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        match self {
            CacheBackend::Redis(cache) => cache.clear().await,
            CacheBackend::Memory(cache) => cache.clear().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redis_kind_without_pool_falls_back_to_memory() {
        let backend = CacheBackend::<String>::from_kind(
            CacheBackendKind::Redis,
            None,
            MemoryConfig::default(),
        );
        assert!(!backend.is_redis());
        assert_eq!(backend.kind(), CacheBackendKind::Memory);
    }
}
