//! Video listing and insertion with tag joins.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use vsrv_models::{NewVideo, UserId, Video, VideoId};
use vsrv_repository::VideoRepository;

use crate::error::ServiceResult;

#[derive(Clone)]
pub struct VideoCatalog {
    repo: Arc<dyn VideoRepository>,
}

impl VideoCatalog {
    pub fn new(repo: Arc<dyn VideoRepository>) -> Self {
        Self { repo }
    }

    /// Public, non-adult, non-ad videos with their tags.
    pub async fn public_videos(&self) -> ServiceResult<Vec<Video>> {
        let records = self.repo.get_public_videos().await?;
        let rows = self.repo.get_all_video_tags().await?;

        Ok(records
            .into_iter()
            .map(|record| Video::from_record(record, &rows))
            .collect())
    }

    /// Public, non-ad videos of one uploader, each listed once.
    pub async fn videos_by_uploader(&self, uploader_id: &UserId) -> ServiceResult<Vec<Video>> {
        let records = self.repo.get_videos_by_uploader(uploader_id).await?;
        let rows = self.repo.get_video_tags_by_uploader(uploader_id).await?;

        Ok(records
            .into_iter()
            .map(|record| Video::from_record(record, &rows))
            .collect())
    }

    pub async fn video(&self, video_id: &VideoId) -> ServiceResult<Video> {
        let record = self.repo.get_video(video_id).await?;
        let rows = self.repo.get_video_tags(video_id).await?;
        Ok(Video::from_record(record, &rows))
    }

    /// Insert a video and its tags.
    ///
    /// The tag loop is not transactional: if any tag fails, the video row
    /// and whatever associations were made are deleted before the error is
    /// returned.
    pub async fn insert_video(&self, new_video: &NewVideo) -> ServiceResult<Video> {
        let record = new_video.to_record(Utc::now());
        self.repo.create_video(&record).await?;

        if let Err(e) = self.insert_tags(new_video).await {
            warn!(video_id = %record.id, error = %e, "Tag insert failed, removing video");
            if let Err(cleanup) = self.repo.delete_video(&record.id).await {
                warn!(video_id = %record.id, error = %cleanup, "Compensating delete failed");
            }
            return Err(e);
        }

        info!(video_id = %record.id, tags = new_video.tags.len(), "Video inserted");
        Ok(Video {
            tags: new_video.tags.clone(),
            ..Video::from_record(record, [])
        })
    }

    async fn insert_tags(&self, new_video: &NewVideo) -> ServiceResult<()> {
        for name in &new_video.tags {
            let tag_id = self.repo.create_tag(name).await?;
            self.repo.associate_tag(&new_video.id, tag_id).await?;
        }
        Ok(())
    }
}
