//! Clip cutting: extract, upload, clean up.

use std::path::Path;

use vsrv_media::{ClipExtractor, ClipRange};
use vsrv_models::{UserId, VideoId};
use vsrv_storage::{public_url, Uploader};

use crate::error::ServiceResult;
use crate::logging::OperationLogger;
use crate::metrics;

#[derive(Clone)]
pub struct ClipService {
    extractor: ClipExtractor,
    uploader: Uploader,
    storage_base_url: String,
    clip_bucket: String,
}

impl ClipService {
    pub fn new(
        extractor: ClipExtractor,
        uploader: Uploader,
        storage_base_url: impl Into<String>,
        clip_bucket: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            uploader,
            storage_base_url: storage_base_url.into(),
            clip_bucket: clip_bucket.into(),
        }
    }

    /// Cut `[start, end)` seconds out of `video_id` and return the clip's public URL.
    ///
    /// The local artifact is removed whether or not the upload succeeded.
    pub async fn cut(
        &self,
        video_id: &VideoId,
        user_id: &UserId,
        start: u32,
        end: u32,
    ) -> ServiceResult<String> {
        let logger = OperationLogger::new("clip_cut", video_id.as_str());
        logger.log_start(&format!("user={} range={}..{}", user_id, start, end));

        let result = self.run(&logger, video_id, user_id, start, end).await;
        match &result {
            Ok(url) => {
                metrics::record_clip("success");
                logger.log_completion(url);
            }
            Err(e) => {
                metrics::record_clip(e.kind());
                logger.log_error(&e.to_string());
            }
        }
        result
    }

    async fn run(
        &self,
        logger: &OperationLogger,
        video_id: &VideoId,
        user_id: &UserId,
        start: u32,
        end: u32,
    ) -> ServiceResult<String> {
        let range = ClipRange::new(start, end)?;
        let artifact = self.extractor.extract(video_id, user_id, range).await?;
        logger.log_progress(&format!("extracted {}", artifact.key));

        let uploaded = self.uploader.upload(&artifact.path, &self.clip_bucket).await;
        remove_artifact(logger, &artifact.path).await;

        let key = uploaded?;
        Ok(public_url(&self.storage_base_url, &self.clip_bucket, &key))
    }
}

async fn remove_artifact(logger: &OperationLogger, path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        logger.log_warning(&format!("failed to remove {}: {}", path.display(), e));
    }
}
