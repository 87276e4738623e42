//! Service error types.

use thiserror::Error;

use vsrv_cache::CacheError;
use vsrv_media::MediaError;
use vsrv_repository::RepositoryError;
use vsrv_storage::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    #[error("Invalid clip range: {0}")]
    InvalidRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Transcode error: {0}")]
    Transcode(MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidMedia(msg) => Self::InvalidMedia(msg),
            MediaError::InvalidRange(msg) => Self::InvalidRange(msg),
            MediaError::Io(e) => Self::Io(e),
            other => Self::Transcode(other),
        }
    }
}

impl ServiceError {
    pub fn rate_limited(subject: impl Into<String>) -> Self {
        Self::RateLimited(subject.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if error is retryable.
    ///
    /// Nothing is retried internally; callers decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Cache(_) => true,
            ServiceError::Repository(e) => e.is_retryable(),
            ServiceError::Storage(e) => {
                matches!(e, StorageError::UploadFailed(_) | StorageError::AwsSdk(_))
            }
            ServiceError::Transcode(e) => matches!(e, MediaError::Timeout(_)),
            _ => false,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::RateLimited(_) => "rate_limited",
            ServiceError::InvalidMedia(_) => "invalid_media",
            ServiceError::InvalidRange(_) => "invalid_range",
            ServiceError::Io(_) => "io",
            ServiceError::Repository(_) => "repository",
            ServiceError::Cache(_) => "cache",
            ServiceError::Transcode(_) => "transcode",
            ServiceError::Storage(_) => "storage",
            ServiceError::Config(_) => "config",
        }
    }
}
