//! Cache store abstraction.
//!
//! [`CacheStore`] is the object-safe backend seam (raw strings + TTL).
//! [`TypedCache`] layers JSON (de)serialization, namespaced keys and
//! metrics on top of any backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};
use crate::keys::CacheKey;
use crate::metrics::{record_lookup, record_write, LookupOutcome};

/// Key-value cache with per-entry expiry.
///
/// Implementations must be safe for concurrent use from many requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the raw value under `key`, `None` on miss or expiry.
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    /// Unconditionally store `value` under `key` for `ttl`.
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Store `value` only if `key` is absent. Returns `true` when the entry
    /// was newly created.
    async fn set_raw_if_absent(&self, key: &str, value: String, ttl: Duration) -> CacheResult<bool>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}

/// Typed access to a [`CacheStore`] through namespaced keys.
#[async_trait]
pub trait TypedCache: CacheStore {
    /// Look up and decode the entry under `key`.
    async fn get<T>(&self, key: &CacheKey) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send;

    /// Encode and store `value` with the namespace TTL.
    async fn set<T>(&self, key: &CacheKey, value: &T) -> CacheResult<()>
    where
        T: Serialize + Sync;

    /// Encode and store `value` with the namespace TTL if no entry exists.
    async fn set_if_absent<T>(&self, key: &CacheKey, value: &T) -> CacheResult<bool>
    where
        T: Serialize + Sync;

    /// Whether an entry exists under `key`; the payload is not decoded.
    async fn contains(&self, key: &CacheKey) -> CacheResult<bool>;

    /// Remove the entry under `key`.
    async fn remove(&self, key: &CacheKey) -> CacheResult<()>;
}

#[async_trait]
impl<C> TypedCache for C
where
    C: CacheStore + ?Sized,
{
    async fn get<T>(&self, key: &CacheKey) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let raw = match self.get_raw(key.as_str()).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get error");
                record_lookup(key.namespace(), LookupOutcome::Error);
                return Err(e);
            }
        };

        match raw {
            Some(data) => {
                let value = serde_json::from_str(&data).map_err(|e| {
                    warn!(key = %key, error = %e, "Cache deserialization failed");
                    record_lookup(key.namespace(), LookupOutcome::Error);
                    CacheError::Serialization(e)
                })?;
                debug!(key = %key, "Cache hit");
                record_lookup(key.namespace(), LookupOutcome::Hit);
                Ok(Some(value))
            }
            None => {
                debug!(key = %key, "Cache miss");
                record_lookup(key.namespace(), LookupOutcome::Miss);
                Ok(None)
            }
        }
    }

    async fn set<T>(&self, key: &CacheKey, value: &T) -> CacheResult<()>
    where
        T: Serialize + Sync,
    {
        let data = serde_json::to_string(value)?;
        self.set_raw(key.as_str(), data, key.ttl()).await?;

        debug!(key = %key, ttl_secs = key.ttl().as_secs(), "Cache set");
        record_write(key.namespace(), "set");
        Ok(())
    }

    async fn set_if_absent<T>(&self, key: &CacheKey, value: &T) -> CacheResult<bool>
    where
        T: Serialize + Sync,
    {
        let data = serde_json::to_string(value)?;
        let created = self.set_raw_if_absent(key.as_str(), data, key.ttl()).await?;

        debug!(key = %key, created, "Cache set if absent");
        if created {
            record_write(key.namespace(), "set_if_absent");
        }
        Ok(created)
    }

    async fn contains(&self, key: &CacheKey) -> CacheResult<bool> {
        let raw = self.get_raw(key.as_str()).await.map_err(|e| {
            record_lookup(key.namespace(), LookupOutcome::Error);
            e
        })?;

        let outcome = if raw.is_some() {
            LookupOutcome::Hit
        } else {
            LookupOutcome::Miss
        };
        record_lookup(key.namespace(), outcome);
        Ok(raw.is_some())
    }

    async fn remove(&self, key: &CacheKey) -> CacheResult<()> {
        self.delete(key.as_str()).await?;

        debug!(key = %key, "Cache delete");
        record_write(key.namespace(), "delete");
        Ok(())
    }
}
