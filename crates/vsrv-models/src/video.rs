//! Video models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of an account (uploader or viewer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Row identifier of a tag in the repository.
pub type TagId = i64;

/// Visibility and classification flags of a video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFlags {
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_adult: bool,
    #[serde(default)]
    pub is_external_cutout: bool,
    #[serde(default)]
    pub is_ad: bool,
}

impl VideoFlags {
    /// Listed on the public feed: public, non-adult and not an ad.
    pub fn is_publicly_listed(&self) -> bool {
        !self.is_private && !self.is_adult && !self.is_ad
    }

    /// Listed on an uploader's page: public and not an ad.
    pub fn is_listed_for_uploader(&self) -> bool {
        !self.is_private && !self.is_ad
    }
}

/// Video row as stored by the repository (tags live in a separate association).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    pub source_url: String,
    pub thumbnail_url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub watch_count: u64,
    #[serde(flatten)]
    pub flags: VideoFlags,
    pub uploader_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A (video, tag name) association row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTagRow {
    pub video_id: VideoId,
    pub tag_name: String,
}

/// Video as returned to callers, with its tag sequence reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub source_url: String,
    pub thumbnail_url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub watch_count: u64,
    #[serde(flatten)]
    pub flags: VideoFlags,
    pub uploader_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Build a video from its row, keeping the tags of `rows` that belong to it, in order.
    pub fn from_record<'a, I>(record: VideoRecord, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a VideoTagRow>,
    {
        let tags = rows
            .into_iter()
            .filter(|row| row.video_id == record.id)
            .map(|row| row.tag_name.clone())
            .collect();

        Self {
            id: record.id,
            source_url: record.source_url,
            thumbnail_url: record.thumbnail_url,
            title: record.title,
            description: record.description,
            tags,
            watch_count: record.watch_count,
            flags: record.flags,
            uploader_id: record.uploader_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Insert payload for a new video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVideo {
    pub id: VideoId,
    pub source_url: String,
    pub thumbnail_url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub uploader_id: UserId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub flags: VideoFlags,
}

impl NewVideo {
    /// Convert into a fresh repository row with a zero watch count.
    pub fn to_record(&self, now: DateTime<Utc>) -> VideoRecord {
        VideoRecord {
            id: self.id.clone(),
            source_url: self.source_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            watch_count: 0,
            flags: self.flags,
            uploader_id: self.uploader_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
