//! Shared data models for the video server core.
//!
//! This crate provides Serde-serializable types for:
//! - Video identity, rows and tag associations
//! - Insert payloads
//! - Identifier helpers shared by cache keys and clip keys

pub mod utils;
pub mod video;

// Re-export common types
pub use utils::{join_ids, new_uuid, ID_SEPARATOR};
pub use video::{NewVideo, TagId, UserId, Video, VideoFlags, VideoId, VideoRecord, VideoTagRow};
