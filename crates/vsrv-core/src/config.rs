//! Core configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vsrv_media::{ClipConfig, TranscoderConfig};
use vsrv_storage::validate_base_url;

use crate::error::{ServiceError, ServiceResult};

/// What to do when the cache backend fails during a gate check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheFailurePolicy {
    /// Surface the failure to the caller.
    #[default]
    FailClosed,
    /// Log a warning and let the request through.
    FailOpen,
}

impl CacheFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheFailurePolicy::FailClosed => "fail_closed",
            CacheFailurePolicy::FailOpen => "fail_open",
        }
    }

    pub fn is_fail_open(&self) -> bool {
        matches!(self, CacheFailurePolicy::FailOpen)
    }
}

impl fmt::Display for CacheFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheFailurePolicy {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_closed" | "closed" => Ok(CacheFailurePolicy::FailClosed),
            "fail_open" | "open" => Ok(CacheFailurePolicy::FailOpen),
            other => Err(ServiceError::config_error(format!(
                "unknown cache failure policy: {}",
                other
            ))),
        }
    }
}

/// Core configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Public base URL of the object store
    pub storage_base_url: String,
    /// Redis connection URL
    pub redis_url: String,
    /// Bucket holding source HLS renditions
    pub source_bucket: String,
    /// Bucket receiving clips
    pub clip_bucket: String,
    /// Local working directory for clips
    pub work_dir: PathBuf,
    /// Per-invocation transcoder timeout
    pub transcode_timeout: Duration,
    /// FFmpeg program name or path
    pub ffmpeg_path: String,
    /// FFprobe program name or path
    pub ffprobe_path: String,
    /// Reject clip ranges past the probed source duration
    pub verify_clip_bounds: bool,
    pub cache_failure_policy: CacheFailurePolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_base_url: "http://localhost:9000".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            source_bucket: "video".to_string(),
            clip_bucket: "cut-video".to_string(),
            work_dir: PathBuf::from("cut-video"),
            transcode_timeout: Duration::from_secs(600),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            verify_clip_bounds: true,
            cache_failure_policy: CacheFailurePolicy::FailClosed,
        }
    }
}

impl CoreConfig {
    /// Create config from environment variables.
    ///
    /// `AWS_S3_URL` is required; everything else has a default.
    pub fn from_env() -> ServiceResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(get: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_base_url =
            get("AWS_S3_URL").ok_or_else(|| ServiceError::config_error("AWS_S3_URL not set"))?;
        validate_base_url(&storage_base_url)?;

        let cache_failure_policy = match get("VSRV_CACHE_FAILURE_POLICY") {
            Some(v) => v.parse()?,
            None => defaults.cache_failure_policy,
        };

        Ok(Self {
            storage_base_url,
            redis_url: get("REDIS_URL").unwrap_or(defaults.redis_url),
            source_bucket: get("VSRV_SOURCE_BUCKET").unwrap_or(defaults.source_bucket),
            clip_bucket: get("VSRV_CLIP_BUCKET").unwrap_or(defaults.clip_bucket),
            work_dir: get("VSRV_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            transcode_timeout: get("VSRV_TRANSCODE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.transcode_timeout),
            ffmpeg_path: get("VSRV_FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: get("VSRV_FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            verify_clip_bounds: get("VSRV_VERIFY_CLIP_BOUNDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.verify_clip_bounds),
            cache_failure_policy,
        })
    }

    pub fn transcoder_config(&self) -> TranscoderConfig {
        TranscoderConfig {
            ffmpeg_path: self.ffmpeg_path.clone(),
            ffprobe_path: self.ffprobe_path.clone(),
            timeout: self.transcode_timeout,
        }
    }

    pub fn clip_config(&self) -> ClipConfig {
        ClipConfig {
            storage_base_url: self.storage_base_url.clone(),
            source_bucket: self.source_bucket.clone(),
            work_dir: self.work_dir.clone(),
            verify_bounds: self.verify_clip_bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[("AWS_S3_URL", "https://s3.example.com")])).unwrap();

        assert_eq!(config.storage_base_url, "https://s3.example.com");
        assert_eq!(config.source_bucket, "video");
        assert_eq!(config.clip_bucket, "cut-video");
        assert_eq!(config.work_dir, PathBuf::from("cut-video"));
        assert_eq!(config.transcode_timeout, Duration::from_secs(600));
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert!(config.verify_clip_bounds);
        assert_eq!(config.cache_failure_policy, CacheFailurePolicy::FailClosed);
    }

    #[test]
    fn test_overrides() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("AWS_S3_URL", "http://localhost:9000"),
            ("VSRV_CLIP_BUCKET", "clips"),
            ("VSRV_WORK_DIR", "/tmp/clips"),
            ("VSRV_TRANSCODE_TIMEOUT_SECS", "30"),
            ("VSRV_VERIFY_CLIP_BOUNDS", "false"),
            ("VSRV_CACHE_FAILURE_POLICY", "fail_open"),
        ]))
        .unwrap();

        assert_eq!(config.clip_bucket, "clips");
        assert_eq!(config.work_dir, PathBuf::from("/tmp/clips"));
        assert_eq!(config.transcode_timeout, Duration::from_secs(30));
        assert!(!config.verify_clip_bounds);
        assert!(config.cache_failure_policy.is_fail_open());
        assert_eq!(config.clip_config().work_dir, PathBuf::from("/tmp/clips"));
        assert_eq!(config.transcoder_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unparseable_timeout_falls_back() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("AWS_S3_URL", "https://s3.example.com"),
            ("VSRV_TRANSCODE_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.transcode_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_missing_or_bad_base_url() {
        assert!(matches!(
            CoreConfig::from_lookup(lookup(&[])),
            Err(ServiceError::Config(_))
        ));
        assert!(matches!(
            CoreConfig::from_lookup(lookup(&[("AWS_S3_URL", "not a url")])),
            Err(ServiceError::Storage(_))
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("fail_closed".parse::<CacheFailurePolicy>().unwrap(), CacheFailurePolicy::FailClosed);
        assert_eq!("FAIL_OPEN".parse::<CacheFailurePolicy>().unwrap(), CacheFailurePolicy::FailOpen);
        assert!("sometimes".parse::<CacheFailurePolicy>().is_err());
    }
}
