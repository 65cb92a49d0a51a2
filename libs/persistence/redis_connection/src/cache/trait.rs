use std::time::Duration;

/// Cache-specific error type shared by all backends
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Key not found")]
    KeyNotFound,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value cache with per-entry expiry.
///
/// A zero `ttl` stores the entry without expiration. Implementations must be
/// interchangeable: a caller cannot tell which backend served it.
#[async_trait::async_trait]
pub trait CacheTrait: Send + Sync {
    type Value: serde::Serialize
        + serde::de::DeserializeOwned
        + Clone
        + Send
        + Sync;

    /// Get value from cache, returning None if not found or expired
    async fn try_get(&self, key: &str) -> CacheResult<Option<Self::Value>>;

    /// Set value with expiration
    async fn set_with_ttl(
        &self, key: &str, value: &Self::Value, ttl: Duration,
    ) -> CacheResult<()>;

    /// Remove key from cache, reporting whether it was present
    async fn remove(&self, key: &str) -> CacheResult<bool>;

    async fn get(&self, key: &str) -> CacheResult<Self::Value> {
        self.try_get(key).await?.ok_or(CacheError::KeyNotFound)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.try_get(key).await?.is_some())
    }

    /// Set value without expiration
    async fn set(&self, key: &str, value: &Self::Value) -> CacheResult<()> {
        self.set_with_ttl(key, value, Duration::ZERO).await
    }

    /// Clear all entries (optional operation)
    async fn clear(&self) -> CacheResult<()> {
        Err(CacheError::Unsupported(
            "Clear operation not supported by this cache implementation"
                .to_string(),
        ))
    }
}
