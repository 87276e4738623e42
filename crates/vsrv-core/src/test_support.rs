//! Fakes shared by the service tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use vsrv_cache::{CacheError, CacheResult, CacheStore, MemoryCache};
use vsrv_media::{MediaError, MediaResult, TranscodeOutput, TranscodeRequest, Transcoder};
use vsrv_models::{NewVideo, TagId, UserId, VideoFlags, VideoId, VideoRecord, VideoTagRow};
use vsrv_repository::{InMemoryVideoRepository, RepositoryError, RepositoryResult, VideoRepository};
use vsrv_storage::{BlobStore, StorageError, StorageResult};

/// Cache whose backend is unreachable.
#[derive(Debug, Default)]
pub struct DownCache;

#[async_trait]
impl CacheStore for DownCache {
    async fn get_raw(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::backend("connection refused"))
    }

    async fn set_raw(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::backend("connection refused"))
    }

    async fn set_raw_if_absent(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<bool> {
        Err(CacheError::backend("connection refused"))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::backend("connection refused"))
    }
}

/// In-memory cache that rejects writes to keys under a prefix while `fail` is set.
#[derive(Debug)]
pub struct WriteFailingCache {
    pub inner: MemoryCache,
    pub prefix: &'static str,
    pub fail: AtomicBool,
}

impl WriteFailingCache {
    pub fn failing_prefix(prefix: &'static str) -> Self {
        Self {
            inner: MemoryCache::new(),
            prefix,
            fail: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl CacheStore for WriteFailingCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        self.inner.get_raw(key).await
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        if self.fail.load(Ordering::SeqCst) && key.starts_with(self.prefix) {
            return Err(CacheError::backend("write rejected"));
        }
        self.inner.set_raw(key, value, ttl).await
    }

    async fn set_raw_if_absent(&self, key: &str, value: String, ttl: Duration) -> CacheResult<bool> {
        self.inner.set_raw_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.inner.delete(key).await
    }
}

/// In-memory repository with switchable failures.
#[derive(Debug, Default)]
pub struct FlakyRepository {
    pub inner: InMemoryVideoRepository,
    pub fail_increment: AtomicBool,
    /// Fail `associate_tag` once this many associations have succeeded.
    pub fail_associate_after: Mutex<Option<usize>>,
    pub associations: AtomicUsize,
    pub deletes: AtomicUsize,
}

#[async_trait]
impl VideoRepository for FlakyRepository {
    async fn get_public_videos(&self) -> RepositoryResult<Vec<VideoRecord>> {
        self.inner.get_public_videos().await
    }

    async fn get_videos_by_uploader(&self, uploader_id: &UserId) -> RepositoryResult<Vec<VideoRecord>> {
        self.inner.get_videos_by_uploader(uploader_id).await
    }

    async fn get_video(&self, video_id: &VideoId) -> RepositoryResult<VideoRecord> {
        self.inner.get_video(video_id).await
    }

    async fn get_video_tags(&self, video_id: &VideoId) -> RepositoryResult<Vec<VideoTagRow>> {
        self.inner.get_video_tags(video_id).await
    }

    async fn get_all_video_tags(&self) -> RepositoryResult<Vec<VideoTagRow>> {
        self.inner.get_all_video_tags().await
    }

    async fn get_video_tags_by_uploader(&self, uploader_id: &UserId) -> RepositoryResult<Vec<VideoTagRow>> {
        self.inner.get_video_tags_by_uploader(uploader_id).await
    }

    async fn create_video(&self, record: &VideoRecord) -> RepositoryResult<()> {
        self.inner.create_video(record).await
    }

    async fn create_tag(&self, name: &str) -> RepositoryResult<TagId> {
        self.inner.create_tag(name).await
    }

    async fn associate_tag(&self, video_id: &VideoId, tag_id: TagId) -> RepositoryResult<()> {
        let limit = *self.fail_associate_after.lock().unwrap();
        if limit.is_some_and(|n| self.associations.load(Ordering::SeqCst) >= n) {
            return Err(RepositoryError::backend("lost connection"));
        }
        self.inner.associate_tag(video_id, tag_id).await?;
        self.associations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_watch_count(&self, video_id: &VideoId) -> RepositoryResult<u64> {
        self.inner.get_watch_count(video_id).await
    }

    async fn increment_watch_count(&self, video_id: &VideoId) -> RepositoryResult<()> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(RepositoryError::backend("deadlock detected"));
        }
        self.inner.increment_watch_count(video_id).await
    }

    async fn delete_video(&self, video_id: &VideoId) -> RepositoryResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_video(video_id).await
    }
}

/// Transcoder that writes a small MP4 header instead of running FFmpeg.
#[derive(Debug, Default)]
pub struct FakeTranscoder {
    pub requests: Mutex<Vec<TranscodeRequest>>,
    pub exit_code: Option<i32>,
}

impl FakeTranscoder {
    pub fn failing(exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, request: &TranscodeRequest) -> MediaResult<TranscodeOutput> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(code) = self.exit_code {
            return Err(MediaError::transcode_failed(
                "FFmpeg exited with non-zero status",
                Some("Invalid data found when processing input".to_string()),
                Some(code),
            ));
        }
        tokio::fs::write(&request.output, b"\x00\x00\x00\x18ftypisom").await?;
        Ok(TranscodeOutput::default())
    }

    async fn probe_duration(&self, _input: &str) -> MediaResult<Option<f64>> {
        Ok(None)
    }
}

/// Blob store that records uploads and optionally rejects them.
#[derive(Debug, Default)]
pub struct RecordingBlobStore {
    pub uploads: Mutex<Vec<(String, String, String)>>,
    pub reject: bool,
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn upload_file(
        &self,
        path: &Path,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        if self.reject {
            return Err(StorageError::upload_failed("503 Slow Down"));
        }
        assert!(path.exists(), "artifact must exist while uploading");
        self.uploads
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), content_type.to_string()));
        Ok(())
    }
}

pub fn new_video(id: &str, uploader: &str, tags: &[&str]) -> NewVideo {
    NewVideo {
        id: VideoId::from(id),
        source_url: format!("https://s3.example.com/video/output_{}.m3u8", id),
        thumbnail_url: format!("https://s3.example.com/thumbnail/{}.webp", id),
        title: format!("video {}", id),
        description: Some("description".to_string()),
        uploader_id: UserId::from(uploader),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        flags: VideoFlags::default(),
    }
}

pub fn record(id: &str, uploader: &str) -> VideoRecord {
    new_video(id, uploader, &[]).to_record(Utc::now())
}
