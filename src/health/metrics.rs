//! Engine activity counters.
//!
//! Plain atomics so they can be read without taking the store lock. Each
//! engine owns its own counters; there is no process-wide instance.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct DetectionMetrics {
    /// Events handed to the engine while the feature gate was on
    events_received: AtomicUsize,

    /// Events dropped because detection (globally or for their kind) was off
    events_suppressed: AtomicUsize,

    /// Events the detector judged not to be an issue
    events_dismissed: AtomicUsize,

    /// New issue records created
    issues_created: AtomicUsize,

    /// Events merged into an existing record
    duplicates_coalesced: AtomicUsize,

    /// Import documents rejected by validation
    imports_rejected: AtomicUsize,
}

impl DetectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_suppressed(&self) {
        self.events_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_dismissed(&self) {
        self.events_dismissed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_issue_created(&self) {
        self.issues_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_import_rejected(&self) {
        self.imports_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        let received = self.events_received.load(Ordering::Relaxed);
        let suppressed = self.events_suppressed.load(Ordering::Relaxed);
        let created = self.issues_created.load(Ordering::Relaxed);
        let coalesced = self.duplicates_coalesced.load(Ordering::Relaxed);

        let recorded = created + coalesced;
        let duplicate_rate = if recorded > 0 {
            (coalesced as f64 / recorded as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            events_received: received,
            events_suppressed: suppressed,
            events_dismissed: self.events_dismissed.load(Ordering::Relaxed),
            issues_created: created,
            duplicates_coalesced: coalesced,
            duplicate_rate,
            imports_rejected: self.imports_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub events_received: usize,
    pub events_suppressed: usize,
    pub events_dismissed: usize,
    pub issues_created: usize,
    pub duplicates_coalesced: usize,

    /// Share of recorded events that were duplicates, as a percentage (0-100)
    pub duplicate_rate: f64,

    pub imports_rejected: usize,
}
