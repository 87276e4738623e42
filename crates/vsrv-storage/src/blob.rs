//! Blob store capability.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};

/// Object storage that accepts whole local files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload the file at `path` to `bucket/key`.
    async fn upload_file(
        &self,
        path: &Path,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()>;
}

/// A stored object held by [`MemoryBlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-process blob store keyed by `(bucket, key)`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload_file(
        &self,
        path: &Path,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", path.display(), e)))?;

        self.objects.write().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_keeps_bytes_and_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        tokio::fs::write(&path, b"data").await.unwrap();

        let store = MemoryBlobStore::new();
        store
            .upload_file(&path, "cut-video", "clip.mp4", "video/mp4")
            .await
            .unwrap();

        let object = store.get("cut-video", "clip.mp4").await.unwrap();
        assert_eq!(object.bytes, b"data");
        assert_eq!(object.content_type, "video/mp4");
        assert!(store.get("video", "clip.mp4").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_upload_failure() {
        let dir = TempDir::new().unwrap();
        let store = MemoryBlobStore::new();

        let err = store
            .upload_file(&dir.path().join("nope.mp4"), "b", "nope.mp4", "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
        assert!(store.is_empty().await);
    }
}
