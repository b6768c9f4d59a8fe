//! Translation health engine.
//!
//! Observes translation lookup failures and related localization defects,
//! keeps them as de-duplicated issues, and scores each locale.
//!
//! # Architecture
//!
//! - `issue`: the issue record, its kinds, severities and fingerprint
//! - `detectors`: pure event-to-issue functions, one per issue kind
//! - `heuristic`: swappable classifier for hardcoded-string candidates
//! - `store`: the de-duplicating issue collection
//! - `calculator`: health scores derived from the store
//! - `controller`: which issue kinds may currently be recorded
//! - `codec`: export/import document format
//! - `coverage`, `metrics`: key exposure and activity counters
//! - `engine`: the serialized façade tying the above together
//!
//! # Example
//!
//! ```rust,ignore
//! use translation_health::health::{DetectionEvent, EngineSettings, HealthEngine};
//!
//! let engine = HealthEngine::new(EngineSettings {
//!     known_locales: vec!["en".into()],
//!     ..EngineSettings::default()
//! });
//! engine.handle_event(event);
//! let snapshot = engine.health();
//! ```

mod calculator;
mod codec;
mod controller;
mod coverage;
mod detectors;
mod engine;
mod heuristic;
mod issue;
mod metrics;
mod store;

pub use calculator::{compute_health, HealthSnapshot, LocaleHealth, SeverityWeights, MAX_SCORE};
pub use codec::ExportDocument;
pub use controller::{DetectionConfig, DetectionConfigPatch, DetectionController};
pub use coverage::KeyCoverage;
pub use detectors::{
    detect_fallback_usage, detect_hardcoded_string, detect_missing_translation,
    detect_rtl_violation, DetectionEvent, DetectorContext, FallbackEvent, HardcodedStringEvent,
    LookupMissEvent, RtlObservation,
};
pub use engine::{EngineSettings, HealthEngine, ImportSummary};
pub use heuristic::{DefaultHeuristic, TextHeuristic, DEFAULT_MIN_LENGTH};
pub use issue::{
    fingerprint, full_key, Issue, IssueKind, IssueLocation, IssueStatus, Severity, UNKNOWN,
};
pub use metrics::{DetectionMetrics, MetricsReport};
pub use store::{IssueFilter, IssueStore, RecordOutcome, Recorded};
