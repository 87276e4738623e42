//! Typed cache entries.
//!
//! The JSON shapes match what the existing services write, so entries
//! produced by either side stay readable during a rollout.

use serde::{Deserialize, Serialize};

/// Presence gate for uploads. Only its existence matters; the payload
/// echoes the subject back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    pub id: String,
}

impl RateLimitEntry {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self { id: subject_id.into() }
    }
}

/// Bounded-stale copy of a video's authoritative watch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchCountEntry {
    pub count: u64,
}

/// Marks a (video, viewer) watch as already counted.
///
/// `count` is `None` while an atomic claim is held and the increment has
/// not completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchDedupeMarker {
    pub count: Option<u64>,
}

impl WatchDedupeMarker {
    pub fn pending() -> Self {
        Self { count: None }
    }

    pub fn counted(count: u64) -> Self {
        Self { count: Some(count) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shapes() {
        assert_eq!(
            serde_json::to_string(&RateLimitEntry::new("u1")).unwrap(),
            r#"{"id":"u1"}"#
        );
        assert_eq!(
            serde_json::to_string(&WatchCountEntry { count: 7 }).unwrap(),
            r#"{"count":7}"#
        );
        assert_eq!(
            serde_json::to_string(&WatchDedupeMarker::counted(7)).unwrap(),
            r#"{"count":7}"#
        );
    }

    #[test]
    fn test_marker_reads_legacy_payload() {
        let marker: WatchDedupeMarker = serde_json::from_str(r#"{"count":3}"#).unwrap();
        assert_eq!(marker, WatchDedupeMarker::counted(3));

        let pending: WatchDedupeMarker = serde_json::from_str(r#"{"count":null}"#).unwrap();
        assert_eq!(pending, WatchDedupeMarker::pending());
    }
}
