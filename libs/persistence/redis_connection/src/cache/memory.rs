use std::{
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use moka::future::Cache;
use tokio::{task::JoinHandle, time::Instant};
use tracing::trace;

use super::r#trait::{CacheResult, CacheTrait};
use crate::{config::MemoryConfig, value::Json};

#[derive(Clone)]
struct Entry {
    payload: Bytes,
    expires_at: Option<Instant>,
    generation: u64,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

struct ExpiryTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// In-process cache backed by moka, with one expiry timer per key.
///
/// Setting a key cancels the timer armed for its previous value. Reads also
/// compare against the stored deadline, so an entry whose timer has not run
/// yet is already invisible once its TTL has elapsed.
pub struct MemoryCache<T> {
    entries: Cache<String, Entry>,
    timers: Arc<DashMap<String, ExpiryTimer>>,
    generation: AtomicU64,
    config: MemoryConfig,
    _phantom: PhantomData<T>,
}

impl<T> MemoryCache<T> {
    pub fn new(config: MemoryConfig) -> Self {
        let entries = Cache::builder().max_capacity(config.capacity).build();

        Self {
            entries,
            timers: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
            config,
            _phantom: PhantomData,
        }
    }

    pub fn config(&self) -> &MemoryConfig { &self.config }

    fn cancel_timer(&self, key: &str) {
        if let Some((_, timer)) = self.timers.remove(key) {
            timer.handle.abort();
        }
    }

    fn arm_timer(&self, key: &str, generation: u64, deadline: Instant) {
        let entries = self.entries.clone();
        let timers = Arc::clone(&self.timers);
        let owned_key = key.to_owned();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(entry) = entries.get(&owned_key).await {
                if entry.generation == generation {
                    entries.invalidate(&owned_key).await;
                    trace!(cache.key = %owned_key, "memory cache entry expired");
                }
            }
            timers.remove_if(&owned_key, |_, t| t.generation == generation);
        });

        self.timers
            .insert(key.to_owned(), ExpiryTimer { generation, handle });
    }
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self { Self::new(MemoryConfig::default()) }
}

impl<T> Drop for MemoryCache<T> {
    fn drop(&mut self) {
        for timer in self.timers.iter() {
            timer.handle.abort();
        }
    }
}

#[async_trait]
impl<T> CacheTrait for MemoryCache<T>
where
    T: serde::Serialize
        + serde::de::DeserializeOwned
        + Clone
        + Send
        + Sync
        + 'static,
{
    type Value = T;

    async fn try_get(&self, key: &str) -> CacheResult<Option<Self::Value>> {
        let Some(entry) = self.entries.get(key).await
        else {
            return Ok(None);
        };

        if !entry.is_live(Instant::now()) {
            self.entries.invalidate(key).await;
            return Ok(None);
        }

        let json = Json::<T>::from_bytes(&entry.payload)?;
        Ok(Some(json.inner()))
    }

    async fn set_with_ttl(
        &self, key: &str, value: &Self::Value, ttl: Duration,
    ) -> CacheResult<()> {
        let payload = Bytes::from(Json(value.clone()).to_bytes()?);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);

        self.cancel_timer(key);
        self.entries
            .insert(key.to_owned(), Entry {
                payload,
                expires_at,
                generation,
            })
            .await;

        if let Some(deadline) = expires_at {
            self.arm_timer(key, generation, deadline);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        self.cancel_timer(key);
        let removed = self.entries.remove(key).await;
        Ok(removed.is_some_and(|entry| entry.is_live(Instant::now())))
    }

    async fn clear(&self) -> CacheResult<()> {
        for timer in self.timers.iter() {
            timer.handle.abort();
        }
        self.timers.clear();
        self.entries.invalidate_all();
        Ok(())
    }
}
