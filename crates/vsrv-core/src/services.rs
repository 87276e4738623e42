//! Service wiring.

use std::sync::Arc;

use vsrv_cache::CacheStore;
use vsrv_media::{ClipExtractor, Transcoder};
use vsrv_repository::VideoRepository;
use vsrv_storage::{BlobStore, Uploader};

use crate::catalog::VideoCatalog;
use crate::clip::ClipService;
use crate::config::CoreConfig;
use crate::rate_limit::RateLimiter;
use crate::upload::UploadService;
use crate::watch_count::WatchCountCache;

/// Every service, built once from config and shared collaborators.
#[derive(Clone)]
pub struct CoreServices {
    pub rate_limiter: RateLimiter,
    pub watch_counts: WatchCountCache,
    pub catalog: VideoCatalog,
    pub uploads: UploadService,
    pub clips: ClipService,
}

impl CoreServices {
    pub fn new(
        config: &CoreConfig,
        cache: Arc<dyn CacheStore>,
        repo: Arc<dyn VideoRepository>,
        blobs: Arc<dyn BlobStore>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let policy = config.cache_failure_policy;
        let rate_limiter = RateLimiter::new(cache.clone(), policy);
        let catalog = VideoCatalog::new(repo.clone());

        Self {
            watch_counts: WatchCountCache::new(cache, repo, policy),
            uploads: UploadService::new(rate_limiter.clone(), catalog.clone()),
            clips: ClipService::new(
                ClipExtractor::new(transcoder, config.clip_config()),
                Uploader::new(blobs),
                config.storage_base_url.clone(),
                config.clip_bucket.clone(),
            ),
            rate_limiter,
            catalog,
        }
    }
}
