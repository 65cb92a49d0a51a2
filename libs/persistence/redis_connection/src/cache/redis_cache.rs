use std::{marker::PhantomData, time::Duration};

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Serialize, de::DeserializeOwned};

use super::r#trait::{CacheResult, CacheTrait};
use crate::value::Json;

/// Redis cache implementation using deadpool Redis pool.
///
/// Values are stored as JSON text. The pool opens its first connection on
/// the first command and recycles it afterwards.
pub struct RedisCache<T> {
    pool: deadpool_redis::Pool,
    __phantom: PhantomData<T>,
}

impl<T> RedisCache<T> {
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        Self {
            pool,
            __phantom: PhantomData,
        }
    }
}

impl<T> Clone for RedisCache<T> {
    fn clone(&self) -> Self { Self::new(self.pool.clone()) }
}

#[async_trait]
impl<T> CacheTrait for RedisCache<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Value = T;

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.pool.get().await?;
        Ok(conn.exists(key).await?)
    }

    async fn try_get(&self, key: &str) -> CacheResult<Option<Self::Value>> {
        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|text| Json::<T>::from_text(&text).map(Json::inner))
            .transpose()
    }

    async fn set_with_ttl(
        &self, key: &str, value: &Self::Value, ttl: Duration,
    ) -> CacheResult<()> {
        let text = Json(value.clone()).to_text()?;
        let mut conn = self.pool.get().await?;

        if ttl.is_zero() {
            let _: () = conn.set(key, text).await?;
        }
        else {
            // SETEX has second granularity; never round a live ttl to zero
            let secs = ttl.as_secs().max(1);
            let _: () = conn.set_ex(key, text, secs as _).await?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.pool.get().await?;
        let count: u32 = conn.del(key).await?;
        Ok(count > 0)
    }
}
