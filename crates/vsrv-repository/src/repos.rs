//! Video repository seam.

use async_trait::async_trait;

use vsrv_models::{TagId, UserId, VideoId, VideoRecord, VideoTagRow};

use crate::error::RepositoryResult;

/// System of record for videos, tags and watch counts.
///
/// Every call is independent; no transaction spans multiple calls.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Public, non-adult, non-ad videos.
    async fn get_public_videos(&self) -> RepositoryResult<Vec<VideoRecord>>;

    /// Public, non-ad videos of one uploader.
    async fn get_videos_by_uploader(&self, uploader_id: &UserId) -> RepositoryResult<Vec<VideoRecord>>;

    /// A single video. Fails with `NotFound` when absent.
    async fn get_video(&self, video_id: &VideoId) -> RepositoryResult<VideoRecord>;

    /// Tag rows of one video, in association order.
    async fn get_video_tags(&self, video_id: &VideoId) -> RepositoryResult<Vec<VideoTagRow>>;

    /// Tag rows of every video.
    async fn get_all_video_tags(&self) -> RepositoryResult<Vec<VideoTagRow>>;

    /// Tag rows of every video owned by `uploader_id`.
    async fn get_video_tags_by_uploader(&self, uploader_id: &UserId) -> RepositoryResult<Vec<VideoTagRow>>;

    /// Insert a video row. Fails with `AlreadyExists` on a duplicate id.
    async fn create_video(&self, record: &VideoRecord) -> RepositoryResult<()>;

    /// Insert a tag row and return its id.
    async fn create_tag(&self, name: &str) -> RepositoryResult<TagId>;

    /// Associate an existing tag with an existing video.
    async fn associate_tag(&self, video_id: &VideoId, tag_id: TagId) -> RepositoryResult<()>;

    /// Authoritative watch count.
    async fn get_watch_count(&self, video_id: &VideoId) -> RepositoryResult<u64>;

    /// Atomically add one to the watch count.
    async fn increment_watch_count(&self, video_id: &VideoId) -> RepositoryResult<()>;

    /// Remove a video and its tag associations. Removing an absent video succeeds.
    async fn delete_video(&self, video_id: &VideoId) -> RepositoryResult<()>;
}
