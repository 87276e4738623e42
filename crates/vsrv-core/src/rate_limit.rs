//! Per-subject upload rate limiting.
//!
//! A subject is either gated (an entry exists) or open. Entries expire
//! after [`vsrv_cache::ttl::RATE_LIMIT`].

use std::sync::Arc;

use tracing::{debug, warn};

use vsrv_cache::{CacheError, CacheKey, CacheStore, RateLimitEntry, TypedCache};

use crate::config::CacheFailurePolicy;
use crate::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CacheStore>,
    policy: CacheFailurePolicy,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheStore>, policy: CacheFailurePolicy) -> Self {
        Self { cache, policy }
    }

    /// Fail with `RateLimited` while `subject_id` is gated.
    pub async fn check(&self, subject_id: &str) -> ServiceResult<()> {
        let key = CacheKey::rate_limit(subject_id);
        match self.cache.contains(&key).await {
            Ok(true) => {
                debug!(subject_id, "Rate limited");
                Err(ServiceError::rate_limited(subject_id))
            }
            Ok(false) => Ok(()),
            Err(e) => self.on_cache_failure(subject_id, "check", e).map(|_| ()),
        }
    }

    /// Gate `subject_id` for the full TTL. Call only after the gated action succeeded.
    pub async fn admit(&self, subject_id: &str) -> ServiceResult<()> {
        let key = CacheKey::rate_limit(subject_id);
        match self.cache.set(&key, &RateLimitEntry::new(subject_id)).await {
            Ok(()) => Ok(()),
            Err(e) => self.on_cache_failure(subject_id, "admit", e).map(|_| ()),
        }
    }

    /// Check and gate in one atomic step. Returns `false` when already gated.
    ///
    /// The gate is held for the full TTL even if the action then fails.
    pub async fn try_acquire(&self, subject_id: &str) -> ServiceResult<bool> {
        let key = CacheKey::rate_limit(subject_id);
        match self
            .cache
            .set_if_absent(&key, &RateLimitEntry::new(subject_id))
            .await
        {
            Ok(acquired) => Ok(acquired),
            Err(e) => self.on_cache_failure(subject_id, "try_acquire", e),
        }
    }

    fn on_cache_failure(&self, subject_id: &str, op: &str, err: CacheError) -> ServiceResult<bool> {
        if self.policy.is_fail_open() {
            warn!(subject_id, op, error = %err, "Rate limit cache unavailable, allowing");
            Ok(true)
        } else {
            Err(err.into())
        }
    }
}
