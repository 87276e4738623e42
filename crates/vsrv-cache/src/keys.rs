//! Cache key schema.
//!
//! Every entry lives in a namespace that fixes both its key format and its TTL:
//!
//! | namespace      | key format              | TTL |
//! |----------------|-------------------------|-----|
//! | `rate_limit`   | `upload{subject}`       | 24h |
//! | `watch_count`  | `watchcount:{video}`    | 1h  |
//! | `watch_dedupe` | `{video}:{viewer}`      | 24h |
//!
//! The formats are shared with already-deployed services and must not change.

use std::fmt;
use std::time::Duration;

use vsrv_models::{join_ids, UserId, VideoId};

/// Default TTL values.
pub mod ttl {
    use std::time::Duration;

    pub const RATE_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);
    pub const WATCH_COUNT: Duration = Duration::from_secs(60 * 60);
    pub const WATCH_DEDUPE: Duration = Duration::from_secs(24 * 60 * 60);
}

/// Key namespace of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    RateLimit,
    WatchCount,
    WatchDedupe,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::RateLimit => "rate_limit",
            Namespace::WatchCount => "watch_count",
            Namespace::WatchDedupe => "watch_dedupe",
        }
    }

    /// Expiry applied to every entry of this namespace.
    pub fn ttl(&self) -> Duration {
        match self {
            Namespace::RateLimit => ttl::RATE_LIMIT,
            Namespace::WatchCount => ttl::WATCH_COUNT,
            Namespace::WatchDedupe => ttl::WATCH_DEDUPE,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formatted key together with its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Namespace,
    key: String,
}

impl CacheKey {
    /// Upload rate limit entry for a subject (uploader).
    /// Format: upload{subject_id}
    pub fn rate_limit(subject_id: &str) -> Self {
        Self {
            namespace: Namespace::RateLimit,
            key: format!("upload{}", subject_id),
        }
    }

    /// Cached watch count of a video.
    /// Format: watchcount:{video_id}
    pub fn watch_count(video_id: &VideoId) -> Self {
        Self {
            namespace: Namespace::WatchCount,
            key: join_ids(&["watchcount", video_id.as_str()]),
        }
    }

    /// Per-viewer dedupe marker.
    /// Format: {video_id}:{user_id}
    pub fn watch_dedupe(video_id: &VideoId, user_id: &UserId) -> Self {
        Self {
            namespace: Namespace::WatchDedupe,
            key: join_ids(&[video_id.as_str(), user_id.as_str()]),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.namespace.ttl()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
