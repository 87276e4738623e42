//! Transcoder capability.
//!
//! The clip pipeline talks to the external transcoder only through
//! [`Transcoder`], so tests can substitute a fake that never spawns a
//! process.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::command::{CommandOutput, FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_duration;

/// A single time-bounded stream-copy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    /// Input reference (local path or URL)
    pub input: String,
    /// Local output file
    pub output: PathBuf,
    /// Seek offset in seconds
    pub seek_secs: u32,
    /// Output duration in seconds
    pub duration_secs: u32,
}

impl TranscodeRequest {
    /// FFmpeg invocation for this request:
    /// `-ss <seek> -i <input> -t <duration> -c copy <output>`.
    pub fn to_command(&self) -> FfmpegCommand {
        FfmpegCommand::new(self.input.clone(), &self.output)
            .seek(self.seek_secs)
            .duration(self.duration_secs)
            .codec_copy()
    }
}

/// Captured diagnostics of a successful transcode.
pub type TranscodeOutput = CommandOutput;

/// External transcoding process.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run a request to completion. Non-zero exit or launch failure is an error.
    async fn transcode(&self, request: &TranscodeRequest) -> MediaResult<TranscodeOutput>;

    /// Duration of `input` in seconds, `None` if unknown.
    async fn probe_duration(&self, input: &str) -> MediaResult<Option<f64>>;
}

/// Transcoder configuration.
#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    /// FFmpeg program name or path
    pub ffmpeg_path: String,
    /// FFprobe program name or path
    pub ffprobe_path: String,
    /// Per-invocation timeout
    pub timeout: Duration,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

/// [`Transcoder`] that shells out to the FFmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    runner: FfmpegRunner,
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        let runner = FfmpegRunner::new(config.ffmpeg_path.clone()).with_timeout(config.timeout);
        Self { runner, config }
    }

    /// Abort every in-flight invocation once `cancel_rx` turns true (shutdown).
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.runner = self.runner.with_cancel(cancel_rx);
        self
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(TranscoderConfig::default())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, request: &TranscodeRequest) -> MediaResult<TranscodeOutput> {
        self.runner.run(&request.to_command()).await
    }

    async fn probe_duration(&self, input: &str) -> MediaResult<Option<f64>> {
        probe_duration(&self.config.ffprobe_path, input, self.config.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;

    #[test]
    fn test_request_to_command() {
        let request = TranscodeRequest {
            input: "https://s3.example.com/video/output_abc.m3u8".to_string(),
            output: PathBuf::from("cut-video/abc:1.mp4"),
            seek_secs: 10,
            duration_secs: 15,
        };

        let args = request.to_command().build_args();
        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-ss") + 1], "10");
        assert_eq!(args[pos("-t") + 1], "15");
        assert_eq!(args[pos("-c") + 1], "copy");
        assert!(pos("-ss") < pos("-i"));
        assert_eq!(args.last().unwrap(), "cut-video/abc:1.mp4");
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let transcoder = FfmpegTranscoder::new(TranscoderConfig {
            ffmpeg_path: "definitely-not-ffmpeg-vsrv".to_string(),
            ..Default::default()
        });
        let request = TranscodeRequest {
            input: "in.m3u8".to_string(),
            output: PathBuf::from("out.mp4"),
            seek_secs: 0,
            duration_secs: 1,
        };

        let err = transcoder.transcode(&request).await.unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound(_)));
    }
}
