//! Cache metrics collection.

use metrics::counter;

use crate::keys::Namespace;

/// Metric name constants for consistency.
pub mod names {
    /// Total cache lookups by namespace and result (hit/miss/error).
    pub const LOOKUPS_TOTAL: &str = "cache_lookups_total";

    /// Total cache writes by namespace and kind (set/set_if_absent/delete).
    pub const WRITES_TOTAL: &str = "cache_writes_total";
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
    Error,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Hit => "hit",
            LookupOutcome::Miss => "miss",
            LookupOutcome::Error => "error",
        }
    }
}

pub fn record_lookup(namespace: Namespace, outcome: LookupOutcome) {
    counter!(
        names::LOOKUPS_TOTAL,
        "namespace" => namespace.as_str(),
        "result" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_write(namespace: Namespace, kind: &'static str) {
    counter!(
        names::WRITES_TOTAL,
        "namespace" => namespace.as_str(),
        "kind" => kind
    )
    .increment(1);
}
