use std::time::Duration;

use redis_connection::{
    CacheBackend, CacheError, CacheTrait, MemoryCache, config::MemoryConfig,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Quote {
    category_id: i64,
    price: f64,
}

fn quote(price: f64) -> Quote {
    Quote {
        category_id: 7,
        price,
    }
}

#[tokio::test(start_paused = true)]
async fn test_set_then_get_returns_value() {
    let cache = MemoryCache::<Quote>::default();

    cache
        .set_with_ttl("quote:7", &quote(120.0), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(cache.try_get("quote:7").await.unwrap(), Some(quote(120.0)));
    assert!(cache.exists("quote:7").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache = MemoryCache::<Quote>::default();

    cache
        .set_with_ttl("quote:7", &quote(120.0), Duration::from_secs(5))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(cache.try_get("quote:7").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(cache.try_get("quote:7").await.unwrap(), None);
    assert!(matches!(
        cache.get("quote:7").await,
        Err(CacheError::KeyNotFound)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_never_expires() {
    let cache = MemoryCache::<Quote>::default();

    cache
        .set_with_ttl("quote:7", &quote(99.5), Duration::ZERO)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(86_400 * 7)).await;
    assert_eq!(cache.try_get("quote:7").await.unwrap(), Some(quote(99.5)));
}

#[tokio::test(start_paused = true)]
async fn test_overwrite_replaces_previous_timer() {
    let cache = MemoryCache::<Quote>::default();

    cache
        .set_with_ttl("quote:7", &quote(100.0), Duration::from_secs(5))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    cache
        .set_with_ttl("quote:7", &quote(150.0), Duration::from_secs(10))
        .await
        .unwrap();

    // The first timer would have fired here
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(cache.try_get("quote:7").await.unwrap(), Some(quote(150.0)));

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(cache.try_get("quote:7").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_overwrite_without_ttl_cancels_expiry() {
    let cache = MemoryCache::<Quote>::default();

    cache
        .set_with_ttl("quote:7", &quote(100.0), Duration::from_secs(5))
        .await
        .unwrap();
    cache.set("quote:7", &quote(101.0)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(cache.try_get("quote:7").await.unwrap(), Some(quote(101.0)));
}

#[tokio::test]
async fn test_remove_reports_presence() {
    let cache = MemoryCache::<Quote>::default();

    cache.set("quote:7", &quote(80.0)).await.unwrap();

    assert!(cache.remove("quote:7").await.unwrap());
    assert!(!cache.remove("quote:7").await.unwrap());
    assert_eq!(cache.try_get("quote:7").await.unwrap(), None);
}

#[tokio::test]
async fn test_clear_drops_everything() {
    let cache = MemoryCache::<Quote>::default();

    cache.set("a", &quote(1.0)).await.unwrap();
    cache
        .set_with_ttl("b", &quote(2.0), Duration::from_secs(30))
        .await
        .unwrap();
    cache.clear().await.unwrap();

    assert_eq!(cache.try_get("a").await.unwrap(), None);
    assert_eq!(cache.try_get("b").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_backend_enum_dispatches_to_memory() {
    let backend = CacheBackend::<Quote>::memory(MemoryConfig::default());

    backend
        .set_with_ttl("quote:9", &quote(42.0), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(backend.try_get("quote:9").await.unwrap(), Some(quote(42.0)));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.try_get("quote:9").await.unwrap(), None);
}
