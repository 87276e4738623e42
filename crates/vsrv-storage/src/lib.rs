//! Object storage for clip artifacts.
//!
//! This crate provides:
//! - The `BlobStore` capability with S3-compatible and in-memory backends
//! - Artifact uploads keyed by file name
//! - Public URL formatting

pub mod blob;
pub mod client;
pub mod error;
pub mod uploader;

pub use blob::{BlobStore, MemoryBlobStore, StoredObject};
pub use client::{S3BlobStore, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use uploader::{content_type_for, public_url, validate_base_url, Uploader};
