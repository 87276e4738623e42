//! Watch counting with per-viewer dedupe.
//!
//! The repository holds the authoritative count. The cache holds a copy
//! that may lag by up to [`vsrv_cache::ttl::WATCH_COUNT`] and a dedupe
//! marker per (video, viewer) that lives for [`vsrv_cache::ttl::WATCH_DEDUPE`].
//! Every repository increment happens before the cache refresh and the
//! marker write that follow it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use vsrv_cache::{CacheKey, CacheStore, TypedCache, WatchCountEntry, WatchDedupeMarker};
use vsrv_models::{UserId, VideoId};
use vsrv_repository::VideoRepository;

use crate::config::CacheFailurePolicy;
use crate::error::ServiceResult;
use crate::metrics;

#[derive(Clone)]
pub struct WatchCountCache {
    cache: Arc<dyn CacheStore>,
    repo: Arc<dyn VideoRepository>,
    policy: CacheFailurePolicy,
}

impl WatchCountCache {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        repo: Arc<dyn VideoRepository>,
        policy: CacheFailurePolicy,
    ) -> Self {
        Self { cache, repo, policy }
    }

    /// Watch count of `video_id`, read through the cache.
    pub async fn get_count(&self, video_id: &VideoId) -> ServiceResult<u64> {
        let key = CacheKey::watch_count(video_id);

        match self.cache.get::<WatchCountEntry>(&key).await {
            Ok(Some(entry)) => return Ok(entry.count),
            Ok(None) => {}
            Err(e) if self.policy.is_fail_open() => {
                warn!(video_id = %video_id, error = %e, "Watch count cache unavailable, reading repository");
                return Ok(self.repo.get_watch_count(video_id).await?);
            }
            Err(e) => return Err(e.into()),
        }

        let count = self.repo.get_watch_count(video_id).await?;
        match self.cache.set(&key, &WatchCountEntry { count }).await {
            Ok(()) => debug!(video_id = %video_id, count, "Watch count cached"),
            Err(e) if self.policy.is_fail_open() => {
                warn!(video_id = %video_id, error = %e, "Failed to cache watch count");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(count)
    }

    /// Whether `user_id`'s watch of `video_id` was counted within the dedupe window.
    pub async fn has_counted(&self, video_id: &VideoId, user_id: &UserId) -> ServiceResult<bool> {
        Ok(self
            .cache
            .contains(&CacheKey::watch_dedupe(video_id, user_id))
            .await?)
    }

    /// Count a watch and return the new total.
    ///
    /// Call only after [`WatchCountCache::has_counted`] returned `false`;
    /// concurrent callers for the same viewer may both count. Use
    /// [`WatchCountCache::record_watch_once`] where that matters.
    pub async fn record_watch(&self, video_id: &VideoId, user_id: &UserId) -> ServiceResult<u64> {
        self.repo.increment_watch_count(video_id).await?;
        let count = self.refresh_count(video_id).await?;
        self.cache
            .set(
                &CacheKey::watch_dedupe(video_id, user_id),
                &WatchDedupeMarker::counted(count),
            )
            .await?;

        metrics::record_watch("counted");
        info!(video_id = %video_id, user_id = %user_id, count, "Watch counted");
        Ok(count)
    }

    /// Count a watch unless this viewer already has one in the window.
    ///
    /// Returns `None` for a duplicate, in which case the repository is not
    /// touched.
    pub async fn record_watch_once(
        &self,
        video_id: &VideoId,
        user_id: &UserId,
    ) -> ServiceResult<Option<u64>> {
        let marker_key = CacheKey::watch_dedupe(video_id, user_id);

        if !self
            .cache
            .set_if_absent(&marker_key, &WatchDedupeMarker::pending())
            .await?
        {
            metrics::record_watch("duplicate");
            debug!(video_id = %video_id, user_id = %user_id, "Watch already counted");
            return Ok(None);
        }

        if let Err(e) = self.repo.increment_watch_count(video_id).await {
            // Nothing was counted; release the claim so a later request can.
            if let Err(release) = self.cache.remove(&marker_key).await {
                warn!(video_id = %video_id, user_id = %user_id, error = %release, "Failed to release watch claim");
            }
            return Err(e.into());
        }

        // The viewer is counted from here on. The pending claim stays even
        // if the refresh fails.
        let count = self.refresh_count(video_id).await?;
        self.cache
            .set(&marker_key, &WatchDedupeMarker::counted(count))
            .await?;

        metrics::record_watch("counted");
        info!(video_id = %video_id, user_id = %user_id, count, "Watch counted");
        Ok(Some(count))
    }

    async fn refresh_count(&self, video_id: &VideoId) -> ServiceResult<u64> {
        let count = self.repo.get_watch_count(video_id).await?;
        self.cache
            .set(&CacheKey::watch_count(video_id), &WatchCountEntry { count })
            .await?;
        Ok(count)
    }
}
