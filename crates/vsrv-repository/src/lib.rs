//! System-of-record seam for videos, tags and watch counts.
//!
//! This crate provides:
//! - The `VideoRepository` trait consumed by the core services
//! - An in-memory implementation for tests and local development

pub mod error;
pub mod memory;
pub mod repos;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::InMemoryVideoRepository;
pub use repos::VideoRepository;
