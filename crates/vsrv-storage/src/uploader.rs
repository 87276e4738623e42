//! Artifact uploads and public URLs.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::blob::BlobStore;
use crate::error::{StorageError, StorageResult};

/// Content type for an object key, by extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("m3u8") => "application/vnd.apple.mpegurl",
        _ => "application/octet-stream",
    }
}

/// Public location of an object: `<base>/<bucket>/<key>`.
///
/// Pure formatting; the object is not checked for existence.
pub fn public_url(base_url: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), bucket, key)
}

/// Check that `base_url` is an absolute http(s) URL.
pub fn validate_base_url(base_url: &str) -> StorageResult<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| StorageError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(StorageError::InvalidBaseUrl(format!(
            "{}: unsupported scheme {}",
            base_url, other
        ))),
    }
}

/// Pushes local artifacts to a [`BlobStore`] under their file name.
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn BlobStore>,
}

impl Uploader {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Upload `local_path` into `bucket`, returning the object key.
    ///
    /// Not retried.
    pub async fn upload(&self, local_path: &Path, bucket: &str) -> StorageResult<String> {
        let key = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::invalid_key(local_path.display().to_string()))?
            .to_string();
        let content_type = content_type_for(&key);

        if let Err(e) = self
            .store
            .upload_file(local_path, bucket, &key, content_type)
            .await
        {
            warn!(bucket, key = key.as_str(), error = %e, "Upload failed");
            return Err(e);
        }

        info!(bucket, key = key.as_str(), content_type, "Uploaded artifact");
        Ok(key)
    }
}
