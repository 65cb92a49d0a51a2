use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use anyhow::{Context, Result};
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use testcontainers_modules::{
    redis::Redis,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};

static NEXT_PREFIX: AtomicU32 = AtomicU32::new(0);

/// Redis test container with a per-instance key prefix
pub struct TestRedisContainer {
    pub pool: Pool,
    pub connection_string: String,
    pub test_prefix: String,
    // Keep the container alive for the lifetime of this struct
    _container: ContainerAsync<Redis>,
}

impl TestRedisContainer {
    pub async fn new() -> Result<Self> {
        let container = Redis::default()
            .start()
            .await
            .context("Failed to start Redis container")?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(6379).await?;
        let connection_string = format!("redis://{host}:{port}");

        let test_prefix = format!(
            "test_{}_{}:",
            std::process::id(),
            NEXT_PREFIX.fetch_add(1, Ordering::Relaxed)
        );

        let pool = Self::create_pool(&connection_string).await?;

        Ok(Self {
            pool,
            connection_string,
            test_prefix,
            _container: container,
        })
    }

    async fn create_pool(connection_string: &str) -> Result<Pool> {
        let mut cfg = Config::from_url(connection_string);
        cfg.pool = Some(PoolConfig::new(10));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .context("Failed to create Redis pool")?;

        let mut attempts = 0;
        loop {
            match pool.get().await {
                Ok(mut conn) => {
                    match deadpool_redis::redis::cmd("PING")
                        .query_async::<()>(&mut conn)
                        .await
                    {
                        Ok(_) => break,
                        Err(_) if attempts < 20 => {
                            attempts += 1;
                            tokio::time::sleep(Duration::from_millis(500))
                                .await;
                            continue;
                        }
                        Err(e) => return Err(e).context("Redis not ready"),
                    }
                }
                Err(_) if attempts < 20 => {
                    attempts += 1;
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    continue;
                }
                Err(e) => {
                    return Err(e).context("Failed to get Redis connection");
                }
            }
        }

        Ok(pool)
    }

    pub async fn get_connection(&self) -> Result<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Remaining time to live of a key in seconds, `-2` when absent and
    /// `-1` when it never expires.
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.get_connection().await?;
        let ttl = deadpool_redis::redis::cmd("TTL")
            .arg(key)
            .query_async(&mut conn)
            .await?;
        Ok(ttl)
    }

    /// Get a test-prefixed key for isolation
    pub fn test_key(&self, key: &str) -> String {
        format!("{}{}", self.test_prefix, key)
    }
}
