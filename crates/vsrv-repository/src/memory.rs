//! In-memory repository.
//!
//! Mirrors the relational layout (videos, tags, video_tags) so tag joins
//! behave like the SQL implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use vsrv_models::{TagId, UserId, VideoId, VideoRecord, VideoTagRow};

use crate::error::{RepositoryError, RepositoryResult};
use crate::repos::VideoRepository;

#[derive(Debug, Default)]
struct State {
    /// Insertion-ordered video rows
    videos: Vec<VideoRecord>,
    tags: HashMap<TagId, String>,
    next_tag_id: TagId,
    /// (video, tag) association rows in insertion order
    video_tags: Vec<(VideoId, TagId)>,
}

impl State {
    fn video_mut(&mut self, video_id: &VideoId) -> RepositoryResult<&mut VideoRecord> {
        self.videos
            .iter_mut()
            .find(|v| &v.id == video_id)
            .ok_or_else(|| RepositoryError::not_found(format!("video {}", video_id)))
    }

    fn tag_rows<F>(&self, mut keep: F) -> Vec<VideoTagRow>
    where
        F: FnMut(&VideoId) -> bool,
    {
        self.video_tags
            .iter()
            .filter(|(video_id, _)| keep(video_id))
            .filter_map(|(video_id, tag_id)| {
                self.tags.get(tag_id).map(|name| VideoTagRow {
                    video_id: video_id.clone(),
                    tag_name: name.clone(),
                })
            })
            .collect()
    }
}

/// [`VideoRepository`] kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryVideoRepository {
    state: RwLock<State>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a watch count directly, bypassing the increment path.
    pub async fn set_watch_count(&self, video_id: &VideoId, count: u64) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.video_mut(video_id)?.watch_count = count;
        Ok(())
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_public_videos(&self) -> RepositoryResult<Vec<VideoRecord>> {
        let state = self.state.read().await;
        Ok(state
            .videos
            .iter()
            .filter(|v| v.flags.is_publicly_listed())
            .cloned()
            .collect())
    }

    async fn get_videos_by_uploader(&self, uploader_id: &UserId) -> RepositoryResult<Vec<VideoRecord>> {
        let state = self.state.read().await;
        Ok(state
            .videos
            .iter()
            .filter(|v| &v.uploader_id == uploader_id && v.flags.is_listed_for_uploader())
            .cloned()
            .collect())
    }

    async fn get_video(&self, video_id: &VideoId) -> RepositoryResult<VideoRecord> {
        let state = self.state.read().await;
        state
            .videos
            .iter()
            .find(|v| &v.id == video_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("video {}", video_id)))
    }

    async fn get_video_tags(&self, video_id: &VideoId) -> RepositoryResult<Vec<VideoTagRow>> {
        let state = self.state.read().await;
        Ok(state.tag_rows(|id| id == video_id))
    }

    async fn get_all_video_tags(&self) -> RepositoryResult<Vec<VideoTagRow>> {
        let state = self.state.read().await;
        Ok(state.tag_rows(|_| true))
    }

    async fn get_video_tags_by_uploader(&self, uploader_id: &UserId) -> RepositoryResult<Vec<VideoTagRow>> {
        let state = self.state.read().await;
        let owned: Vec<VideoId> = state
            .videos
            .iter()
            .filter(|v| &v.uploader_id == uploader_id)
            .map(|v| v.id.clone())
            .collect();
        Ok(state.tag_rows(|id| owned.contains(id)))
    }

    async fn create_video(&self, record: &VideoRecord) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if state.videos.iter().any(|v| v.id == record.id) {
            return Err(RepositoryError::already_exists(format!("video {}", record.id)));
        }
        state.videos.push(record.clone());
        debug!(video_id = %record.id, "Created video row");
        Ok(())
    }

    async fn create_tag(&self, name: &str) -> RepositoryResult<TagId> {
        let mut state = self.state.write().await;
        state.next_tag_id += 1;
        let tag_id = state.next_tag_id;
        state.tags.insert(tag_id, name.to_string());
        Ok(tag_id)
    }

    async fn associate_tag(&self, video_id: &VideoId, tag_id: TagId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.video_mut(video_id)?;
        if !state.tags.contains_key(&tag_id) {
            return Err(RepositoryError::not_found(format!("tag {}", tag_id)));
        }
        state.video_tags.push((video_id.clone(), tag_id));
        Ok(())
    }

    async fn get_watch_count(&self, video_id: &VideoId) -> RepositoryResult<u64> {
        Ok(self.get_video(video_id).await?.watch_count)
    }

    async fn increment_watch_count(&self, video_id: &VideoId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let video = state.video_mut(video_id)?;
        video.watch_count += 1;
        video.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_video(&self, video_id: &VideoId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.videos.retain(|v| &v.id != video_id);
        state.video_tags.retain(|(id, _)| id != video_id);
        debug!(video_id = %video_id, "Deleted video row");
        Ok(())
    }
}
