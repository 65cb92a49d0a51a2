use deadpool_redis::{Config, CreatePoolError, Pool, Runtime};
pub use deadpool_redis::PoolError;
pub use redis::RedisError;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

pub mod cache;
pub mod config;
pub mod value;

pub use cache::{
    CacheBackend, CacheError, CacheResult, CacheTrait, MemoryCache,
    RedisCache,
};

#[derive(Debug, Error)]
pub enum RedisConnectError {
    #[error("Invalid redis url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Failed to create redis pool: {0}")]
    Pool(#[from] CreatePoolError),
}

/// Builds the `redis://host:port/db` url for a connection config.
pub fn redis_url<C>(config: &C) -> Result<Url, url::ParseError>
where
    C: config::DbConnectConfig,
{
    Url::parse(&format!(
        "redis://{}:{}/{}",
        config.host(),
        config.port(),
        config.db()
    ))
}

/// Creates the connection pool. No connection is opened until the first
/// checkout, after which connections are recycled.
#[instrument(skip_all, name = "connect-redis")]
pub async fn connect_redis_db<C>(config: &C) -> Result<Pool, RedisConnectError>
where
    C: config::DbConnectConfig,
{
    let url = redis_url(config)?;

    info!(redis.url = %url, redis.connect = true);

    let cfg = Config {
        url: Some(url.to_string()),
        pool: Some(deadpool_redis::PoolConfig::default()),
        connection: None,
    };

    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
    Ok(pool)
}
