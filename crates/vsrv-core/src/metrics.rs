//! Service outcome counters.

use metrics::counter;

pub const UPLOADS_TOTAL: &str = "video_uploads_total";
pub const CLIPS_TOTAL: &str = "clip_requests_total";
pub const WATCHES_TOTAL: &str = "video_watches_total";

/// `result` is "success" or an error kind.
pub fn record_upload(result: &'static str) {
    counter!(UPLOADS_TOTAL, "result" => result).increment(1);
}

pub fn record_clip(result: &'static str) {
    counter!(CLIPS_TOTAL, "result" => result).increment(1);
}

/// `result` is "counted" or "duplicate".
pub fn record_watch(result: &'static str) {
    counter!(WATCHES_TOTAL, "result" => result).increment(1);
}
