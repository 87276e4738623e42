//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::{CacheError, CacheResult};
use crate::store::CacheStore;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL
    pub redis_url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
        }
    }
}

impl RedisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }
}

/// [`CacheStore`] backed by Redis `GET` / `SET EX` / `SET NX EX` / `DEL`.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    /// Create a cache from configuration. Does not connect yet.
    pub fn new(config: &RedisConfig) -> CacheResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| CacheError::connection_failed(e.to_string()))?;
        info!("Redis cache configured");
        Ok(Self { client })
    }

    /// Create from environment variables.
    pub fn from_env() -> CacheResult<Self> {
        Self::new(&RedisConfig::from_env())
    }

    /// Round-trip a PING to verify connectivity.
    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!(reply = pong.as_str(), "Redis ping");
        Ok(())
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::connection_failed(e.to_string()))
    }
}

/// Redis rejects `EX 0`; round sub-second TTLs up to one second.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, expiry_secs(ttl)).await?;
        Ok(())
    }

    async fn set_raw_if_absent(&self, key: &str, value: String, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.connection().await?;

        // SET key value NX EX ttl
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(expiry_secs(ttl))
            .query_async(&mut conn)
            .await?;

        Ok(result.is_some())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
