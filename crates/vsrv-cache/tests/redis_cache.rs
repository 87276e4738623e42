//! Redis-backed cache integration tests.

use std::time::Duration;

use vsrv_cache::{CacheKey, CacheStore, RedisCache, TypedCache, WatchCountEntry};
use vsrv_models::VideoId;

fn cache() -> RedisCache {
    dotenvy::dotenv().ok();
    RedisCache::from_env().expect("Failed to create Redis cache")
}

/// Test Redis connection.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_redis_ping() {
    cache().ping().await.expect("Failed to ping Redis");
}

/// Test typed set/get round trip against a live server.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_typed_set_get() {
    let cache = cache();
    let key = CacheKey::watch_count(&VideoId::new());

    cache.set(&key, &WatchCountEntry { count: 42 }).await.unwrap();
    let entry: Option<WatchCountEntry> = cache.get(&key).await.unwrap();
    assert_eq!(entry, Some(WatchCountEntry { count: 42 }));

    cache.remove(&key).await.unwrap();
    let entry: Option<WatchCountEntry> = cache.get(&key).await.unwrap();
    assert!(entry.is_none());
}

/// Test SET NX semantics and expiry.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_set_if_absent_and_expiry() {
    let cache = cache();
    let key = format!("vsrv:test:{}", VideoId::new());

    assert!(cache
        .set_raw_if_absent(&key, "a".to_string(), Duration::from_secs(1))
        .await
        .unwrap());
    assert!(!cache
        .set_raw_if_absent(&key, "b".to_string(), Duration::from_secs(1))
        .await
        .unwrap());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(cache.get_raw(&key).await.unwrap().is_none());
}
