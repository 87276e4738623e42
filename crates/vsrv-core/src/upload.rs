//! Rate-limited video upload.

use tokio::io::{AsyncRead, AsyncSeek};
use tracing::info;

use vsrv_media::validate_media;
use vsrv_models::{NewVideo, Video};

use crate::catalog::VideoCatalog;
use crate::error::ServiceResult;
use crate::metrics;
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct UploadService {
    limiter: RateLimiter,
    catalog: VideoCatalog,
}

impl UploadService {
    pub fn new(limiter: RateLimiter, catalog: VideoCatalog) -> Self {
        Self { limiter, catalog }
    }

    /// Validate and register an uploaded video.
    ///
    /// The uploader is gated only after the video row and its tags were
    /// written; a rejected or failed upload leaves the gate open. The
    /// stream is left at offset 0 for the caller.
    pub async fn upload<R>(&self, stream: Option<&mut R>, new_video: &NewVideo) -> ServiceResult<Video>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + ?Sized,
    {
        let result = self.run(stream, new_video).await;
        match &result {
            Ok(_) => metrics::record_upload("success"),
            Err(e) => metrics::record_upload(e.kind()),
        }
        result
    }

    async fn run<R>(&self, stream: Option<&mut R>, new_video: &NewVideo) -> ServiceResult<Video>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + ?Sized,
    {
        let uploader = new_video.uploader_id.as_str();

        self.limiter.check(uploader).await?;
        validate_media(stream).await?;
        let video = self.catalog.insert_video(new_video).await?;
        self.limiter.admit(uploader).await?;

        info!(video_id = %video.id, uploader_id = %video.uploader_id, "Upload accepted");
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheFailurePolicy;
    use crate::error::ServiceError;
    use crate::test_support::{new_video, FlakyRepository};
    use std::io::Cursor;
    use std::sync::Arc;
    use vsrv_cache::MemoryCache;
    use vsrv_repository::{InMemoryVideoRepository, VideoRepository};

    const MP4: &[u8] = b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00";

    fn service(repo: Arc<dyn VideoRepository>) -> UploadService {
        UploadService::new(
            RateLimiter::new(Arc::new(MemoryCache::new()), CacheFailurePolicy::FailClosed),
            VideoCatalog::new(repo),
        )
    }

    #[tokio::test]
    async fn test_upload_then_rate_limited() {
        let repo = Arc::new(InMemoryVideoRepository::new());
        let service = service(repo.clone());

        let mut stream = Cursor::new(MP4.to_vec());
        let video = service
            .upload(Some(&mut stream), &new_video("a", "u1", &["tag"]))
            .await
            .unwrap();
        assert_eq!(video.tags, vec!["tag"]);
        assert_eq!(stream.position(), 0);

        let mut stream = Cursor::new(MP4.to_vec());
        let err = service
            .upload(Some(&mut stream), &new_video("b", "u1", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RateLimited(_)));
        assert!(repo.get_video(&"b".into()).await.is_err());

        // Other uploaders are unaffected.
        let mut stream = Cursor::new(MP4.to_vec());
        service
            .upload(Some(&mut stream), &new_video("c", "u2", &[]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_media_does_not_gate() {
        let repo = Arc::new(InMemoryVideoRepository::new());
        let service = service(repo.clone());

        let mut stream = Cursor::new(b"GIF89a not a video".to_vec());
        let err = service
            .upload(Some(&mut stream), &new_video("a", "u1", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidMedia(_)));
        assert!(repo.get_video(&"a".into()).await.is_err());

        let err = service
            .upload::<Cursor<Vec<u8>>>(None, &new_video("a", "u1", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidMedia(_)));

        let mut stream = Cursor::new(MP4.to_vec());
        service
            .upload(Some(&mut stream), &new_video("a", "u1", &[]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_insert_does_not_gate() {
        let repo = Arc::new(FlakyRepository::default());
        *repo.fail_associate_after.lock().unwrap() = Some(0);
        let service = service(repo.clone());

        let mut stream = Cursor::new(MP4.to_vec());
        let err = service
            .upload(Some(&mut stream), &new_video("a", "u1", &["tag"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));

        *repo.fail_associate_after.lock().unwrap() = None;
        let mut stream = Cursor::new(MP4.to_vec());
        service
            .upload(Some(&mut stream), &new_video("a", "u1", &["tag"]))
            .await
            .unwrap();
    }
}
