//! The translation health engine.
//!
//! [`HealthEngine`] owns the issue store, the detection controller and the
//! key coverage behind one mutex; every mutation goes through that lock, so
//! read-modify-write sequences are serialized. Detectors and the health
//! calculator run outside the lock against their inputs or a cloned snapshot.
//!
//! When the feature gate is off the engine is inert: events are dropped,
//! mutations do nothing, and reads report a fixed disabled state.

use super::calculator::{compute_health, HealthSnapshot, SeverityWeights};
use super::codec::ExportDocument;
use super::controller::{DetectionConfig, DetectionConfigPatch, DetectionController};
use super::coverage::KeyCoverage;
use super::detectors::{event_route, DetectionEvent, DetectorContext};
use super::heuristic::{DefaultHeuristic, TextHeuristic};
use super::issue::Issue;
use super::metrics::{DetectionMetrics, MetricsReport};
use super::store::{IssueFilter, IssueStore, RecordOutcome};
use crate::error::{HealthError, Result};
use crate::i18n::{LocaleRegistry, ALL_LOCALES};
use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Static settings fixed when the engine is built.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Feature gate; when false the engine is inert
    pub feature_enabled: bool,

    /// Locales scored by the health calculator
    pub known_locales: Vec<String>,

    /// Locale assumed for fallback events that do not name one
    pub fallback_locale: String,

    pub weights: SeverityWeights,

    /// Factory defaults restored by `reset`
    pub default_config: DetectionConfig,

    /// Writing direction lookup for the RTL detector
    pub registry: LocaleRegistry,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            feature_enabled: true,
            known_locales: Vec::new(),
            fallback_locale: "en".to_string(),
            weights: SeverityWeights::default(),
            default_config: DetectionConfig::default(),
            registry: LocaleRegistry::default(),
        }
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub issues_imported: usize,
    pub issues_replaced: usize,
    pub config: DetectionConfig,
}

#[derive(Debug)]
struct EngineState {
    store: IssueStore,
    controller: DetectionController,
    coverage: KeyCoverage,
}

pub struct HealthEngine {
    settings: EngineSettings,
    heuristic: Box<dyn TextHeuristic>,
    state: Mutex<EngineState>,
    metrics: DetectionMetrics,
}

impl HealthEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_heuristic(settings, DefaultHeuristic::default())
    }

    /// Build an engine with a custom hardcoded-string heuristic.
    pub fn with_heuristic(settings: EngineSettings, heuristic: impl TextHeuristic + 'static) -> Self {
        let state = EngineState {
            store: IssueStore::new(),
            controller: DetectionController::new(settings.default_config),
            coverage: KeyCoverage::new(),
        };

        Self {
            settings,
            heuristic: Box::new(heuristic),
            state: Mutex::new(state),
            metrics: DetectionMetrics::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn is_feature_enabled(&self) -> bool {
        self.settings.feature_enabled
    }

    /// A panic while holding the lock cannot leave the state half-written
    /// (every mutation is a single assignment or collection call), so a
    /// poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Inbound Events ====================

    /// Run the matching detector for `event` and record its issue.
    ///
    /// Returns the stored record, or `None` when the engine is gated off,
    /// detection for this kind is disabled, or the detector found nothing.
    pub fn handle_event(&self, event: DetectionEvent) -> Option<Issue> {
        if !self.settings.feature_enabled {
            return None;
        }
        self.metrics.record_event_received();

        let kind = event.kind();
        let ctx = DetectorContext {
            heuristic: self.heuristic.as_ref(),
            fallback_locale: &self.settings.fallback_locale,
            registry: &self.settings.registry,
        };
        let detected = event.detect(&ctx);

        let mut state = self.lock();
        if let Some((locale, full_key)) = event.observed_key() {
            state.coverage.observe(locale, &full_key);
        }

        if !state.controller.allows(kind) {
            self.metrics.record_event_suppressed();
            debug!(
                "Detection disabled for {}, dropping event on {}",
                kind,
                event_route(&event)
            );
            return None;
        }

        let Some(issue) = detected else {
            self.metrics.record_event_dismissed();
            return None;
        };

        Some(self.record_locked(&mut state, issue))
    }

    /// Record an issue produced elsewhere, subject to the same gating as
    /// detector output.
    ///
    /// The issue must satisfy the same invariants as an imported one; in
    /// particular its id must be its fingerprint, or it could shadow the
    /// record a detector would create for the same defect.
    pub fn record(&self, issue: Issue) -> Result<Option<Issue>> {
        if !self.settings.feature_enabled {
            return Ok(None);
        }
        issue.validate().map_err(HealthError::InvalidIssue)?;
        self.metrics.record_event_received();

        let mut state = self.lock();
        if !state.controller.allows(issue.kind) {
            self.metrics.record_event_suppressed();
            debug!("Detection disabled for {}, dropping issue {}", issue.kind, issue.id);
            return Ok(None);
        }

        Ok(Some(self.record_locked(&mut state, issue)))
    }

    fn record_locked(&self, state: &mut EngineState, issue: Issue) -> Issue {
        let recorded = state.store.record(issue);
        match recorded.outcome {
            RecordOutcome::Inserted => {
                self.metrics.record_issue_created();
                info!(
                    "New {} issue {} for '{}' ({})",
                    recorded.issue.kind, recorded.issue.id, recorded.issue.full_key, recorded.issue.locale
                );
            }
            RecordOutcome::Coalesced => {
                self.metrics.record_duplicate();
                debug!(
                    "Issue {} seen again ({} occurrences)",
                    recorded.issue.id, recorded.issue.occurrence_count
                );
            }
            RecordOutcome::Reopened => {
                self.metrics.record_duplicate();
                info!("Resolved issue {} reappeared, reopening", recorded.issue.id);
            }
        }
        recorded.issue
    }

    /// Note a successful lookup so it counts toward the locale's observed keys.
    pub fn observe_lookup(&self, locale: &str, full_key: &str) {
        if !self.settings.feature_enabled {
            return;
        }
        self.lock().coverage.observe(locale, full_key);
    }

    // ==================== Lifecycle ====================

    pub fn resolve(&self, id: &str) -> Option<Issue> {
        if !self.settings.feature_enabled {
            return None;
        }
        let resolved = self.lock().store.resolve(id);
        if resolved.is_none() {
            debug!("Resolve ignored, issue {} not found", id);
        }
        resolved
    }

    pub fn ignore(&self, id: &str) -> Option<Issue> {
        if !self.settings.feature_enabled {
            return None;
        }
        let ignored = self.lock().store.ignore(id);
        if ignored.is_none() {
            debug!("Ignore ignored, issue {} not found", id);
        }
        ignored
    }

    pub fn reopen(&self, id: &str) -> Option<Issue> {
        if !self.settings.feature_enabled {
            return None;
        }
        self.lock().store.reopen(id)
    }

    pub fn clear_resolved(&self) -> usize {
        if !self.settings.feature_enabled {
            return 0;
        }
        let removed = self.lock().store.clear_resolved();
        info!("Cleared {} resolved issues", removed);
        removed
    }

    pub fn clear_all(&self) -> usize {
        if !self.settings.feature_enabled {
            return 0;
        }
        let removed = self.lock().store.clear_all();
        info!("Cleared all {} issues", removed);
        removed
    }

    // ==================== Detection Control ====================

    /// Set the global detection switch, or flip it when `next` is `None`.
    pub fn toggle_detection(&self, next: Option<bool>) -> bool {
        if !self.settings.feature_enabled {
            return false;
        }
        let enabled = self.lock().controller.toggle_detection(next);
        info!("Detection {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    pub fn update_config(&self, patch: DetectionConfigPatch) -> DetectionConfig {
        if !self.settings.feature_enabled {
            return DetectionConfig::disabled();
        }
        let config = self.lock().controller.update_config(patch);
        info!("Detection config updated: {:?}", config);
        config
    }

    /// Restore the factory config and empty the store in one step.
    ///
    /// Key coverage is left alone; it spans the whole process lifetime.
    pub fn reset(&self) {
        if !self.settings.feature_enabled {
            return;
        }
        let mut state = self.lock();
        state.controller.restore_defaults();
        let removed = state.store.clear_all();
        info!("Engine reset, {} issues removed", removed);
    }

    // ==================== Reads ====================

    pub fn issues(&self, filter: &IssueFilter) -> Vec<Issue> {
        if !self.settings.feature_enabled {
            return Vec::new();
        }
        self.lock().store.list(filter)
    }

    pub fn issue(&self, id: &str) -> Option<Issue> {
        if !self.settings.feature_enabled {
            return None;
        }
        self.lock().store.get(id).cloned()
    }

    pub fn config(&self) -> DetectionConfig {
        if !self.settings.feature_enabled {
            return DetectionConfig::disabled();
        }
        self.lock().controller.config()
    }

    /// Compute a fresh health snapshot from the current store.
    pub fn health(&self) -> HealthSnapshot {
        let now = Utc::now();
        if !self.settings.feature_enabled {
            return HealthSnapshot::disabled(now);
        }

        let (issues, coverage) = {
            let state = self.lock();
            (state.store.snapshot(), state.coverage.clone())
        };

        compute_health(
            &issues,
            &self.settings.known_locales,
            &coverage,
            &self.settings.weights,
            now,
        )
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    // ==================== Export / Import ====================

    /// Serialize every issue and the current config.
    pub fn export_data(&self) -> Result<String> {
        let document = if self.settings.feature_enabled {
            let state = self.lock();
            ExportDocument::new(state.store.snapshot(), state.controller.config(), Utc::now())
        } else {
            ExportDocument::new(Vec::new(), DetectionConfig::disabled(), Utc::now())
        };

        let json = document.to_json()?;
        info!("Exported {} issues", document.issues.len());
        Ok(json)
    }

    /// Replace the store and config with the contents of an export document.
    ///
    /// The document is fully validated before anything changes; a rejected
    /// document leaves the engine exactly as it was.
    pub fn import_data(&self, text: &str) -> Result<ImportSummary> {
        if !self.settings.feature_enabled {
            return Err(HealthError::EngineDisabled);
        }

        let document = match ExportDocument::parse(text) {
            Ok(document) => document,
            Err(err) => {
                self.metrics.record_import_rejected();
                warn!("Import rejected: {}", err);
                return Err(err.into());
            }
        };

        let mut state = self.lock();
        for issue in document.issues.iter().filter(|issue| issue.locale != ALL_LOCALES) {
            state.coverage.observe(&issue.locale, &issue.full_key);
        }

        let summary = ImportSummary {
            issues_imported: document.issues.len(),
            issues_replaced: state.store.len(),
            config: document.config,
        };
        state.store.replace_all(document.issues);
        state.controller.replace(document.config);

        info!(
            "Imported {} issues (replaced {}), exported at {}",
            summary.issues_imported, summary.issues_replaced, document.exported_at
        );
        Ok(summary)
    }
}
