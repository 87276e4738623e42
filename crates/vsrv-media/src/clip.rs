//! Clip extraction from stored HLS renditions.
//!
//! A clip is cut from `<base>/<bucket>/output_<video_id>.m3u8` with stream
//! copy into `<work_dir>/<video_id>:<uuid>.mp4`. Uploading and removing the
//! local artifact is the caller's job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use vsrv_models::{join_ids, new_uuid, UserId, VideoId};

use crate::error::{MediaError, MediaResult};
use crate::transcoder::{TranscodeOutput, TranscodeRequest, Transcoder};

/// Container extension of produced clips.
pub const CLIP_EXTENSION: &str = "mp4";

/// Half-open time range `[start, end)` in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRange {
    start: u32,
    end: u32,
}

impl ClipRange {
    /// Create a range, rejecting empty or inverted ones.
    pub fn new(start: u32, end: u32) -> MediaResult<Self> {
        if start >= end {
            return Err(MediaError::invalid_range(format!(
                "start ({}) must be before end ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    /// Reject ranges that end past a source of `source_secs` seconds.
    pub fn check_within(&self, source_secs: f64) -> MediaResult<()> {
        if f64::from(self.end) > source_secs {
            return Err(MediaError::invalid_range(format!(
                "end ({}) is past the source duration ({:.3})",
                self.end, source_secs
            )));
        }
        Ok(())
    }
}

/// URL of the HLS manifest of a stored video.
pub fn source_manifest_url(base_url: &str, bucket: &str, video_id: &VideoId) -> String {
    format!(
        "{}/{}/output_{}.m3u8",
        base_url.trim_end_matches('/'),
        bucket,
        video_id
    )
}

/// Object key of a new clip: `<video_id>:<uuid>.mp4`.
pub fn clip_key(video_id: &VideoId) -> String {
    format!(
        "{}.{}",
        join_ids(&[video_id.as_str(), &new_uuid()]),
        CLIP_EXTENSION
    )
}

/// Clip extractor configuration.
#[derive(Debug, Clone)]
pub struct ClipConfig {
    /// Public base URL of the object store
    pub storage_base_url: String,
    /// Bucket holding source manifests
    pub source_bucket: String,
    /// Local working directory for produced clips
    pub work_dir: PathBuf,
    /// Probe the source and reject ranges past its end
    pub verify_bounds: bool,
}

/// A clip written to the local working directory.
#[derive(Debug, Clone)]
pub struct ClipArtifact {
    /// Object key (also the local file name)
    pub key: String,
    /// Local path
    pub path: PathBuf,
    /// Captured transcoder output
    pub output: TranscodeOutput,
}

/// Cuts clips out of stored videos through a [`Transcoder`].
#[derive(Clone)]
pub struct ClipExtractor {
    transcoder: Arc<dyn Transcoder>,
    config: ClipConfig,
}

impl ClipExtractor {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: ClipConfig) -> Self {
        Self { transcoder, config }
    }

    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    /// Extract `range` of `video_id` into a new local file.
    ///
    /// Blocks the calling task for the whole transcode; the transcoder
    /// enforces the timeout.
    pub async fn extract(
        &self,
        video_id: &VideoId,
        user_id: &UserId,
        range: ClipRange,
    ) -> MediaResult<ClipArtifact> {
        let source = source_manifest_url(
            &self.config.storage_base_url,
            &self.config.source_bucket,
            video_id,
        );

        if self.config.verify_bounds {
            match self.transcoder.probe_duration(&source).await? {
                Some(secs) => range.check_within(secs)?,
                None => warn!(video_id = %video_id, "Source duration unknown, skipping bounds check"),
            }
        }

        tokio::fs::create_dir_all(&self.config.work_dir).await?;

        let key = clip_key(video_id);
        let path = self.config.work_dir.join(&key);

        info!(
            video_id = %video_id,
            user_id = %user_id,
            start = range.start(),
            duration = range.duration(),
            "Extracting clip to {}",
            path.display()
        );

        let request = TranscodeRequest {
            input: source,
            output: path.clone(),
            seek_secs: range.start(),
            duration_secs: range.duration(),
        };

        let output = match self.transcoder.transcode(&request).await {
            Ok(output) => output,
            Err(e) => {
                warn!(video_id = %video_id, error = %e, "Clip transcode failed");
                // A partial file may have been written before the failure.
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %cleanup, "Failed to remove partial clip");
                    }
                }
                return Err(e);
            }
        };

        if !tokio::fs::try_exists(&path).await? {
            return Err(MediaError::transcode_failed(
                format!("transcoder produced no output at {}", path.display()),
                Some(output.combined),
                output.exit_code,
            ));
        }

        info!(video_id = %video_id, key = key.as_str(), "Clip extracted");
        Ok(ClipArtifact { key, path, output })
    }
}
