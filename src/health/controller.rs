//! Detection controller: decides which issue kinds may be recorded.
//!
//! Switching detection off only stops new issues from being recorded; it
//! never touches issues already in the store.

use super::issue::IssueKind;
use serde::{Deserialize, Serialize};

/// Detection switches. Every field is required when read from an import
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    /// Global switch; when false nothing is recorded regardless of the
    /// per-kind toggles
    pub enabled: bool,
    pub detect_missing_keys: bool,
    pub detect_fallback_usage: bool,
    pub detect_hardcoded_strings: bool,
    #[serde(rename = "detectRTLIssues")]
    pub detect_rtl_issues: bool,
}

impl DetectionConfig {
    /// Config reported while the engine is gated off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            detect_missing_keys: false,
            detect_fallback_usage: false,
            detect_hardcoded_strings: false,
            detect_rtl_issues: false,
        }
    }

    /// Per-kind toggle, ignoring the global switch.
    pub fn tracks(&self, kind: IssueKind) -> bool {
        match kind {
            IssueKind::MissingTranslation => self.detect_missing_keys,
            IssueKind::FallbackUsed => self.detect_fallback_usage,
            IssueKind::HardcodedString => self.detect_hardcoded_strings,
            IssueKind::RtlViolation => self.detect_rtl_issues,
        }
    }
}

/// Hardcoded-string detection is off by default; the heuristic is noisy.
impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            detect_missing_keys: true,
            detect_fallback_usage: true,
            detect_hardcoded_strings: false,
            detect_rtl_issues: true,
        }
    }
}

/// Partial update of the per-kind toggles. Unset fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfigPatch {
    #[serde(default)]
    pub detect_missing_keys: Option<bool>,
    #[serde(default)]
    pub detect_fallback_usage: Option<bool>,
    #[serde(default)]
    pub detect_hardcoded_strings: Option<bool>,
    #[serde(default, rename = "detectRTLIssues")]
    pub detect_rtl_issues: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct DetectionController {
    config: DetectionConfig,
    defaults: DetectionConfig,
}

impl DetectionController {
    /// Create a controller whose factory defaults are `defaults`.
    pub fn new(defaults: DetectionConfig) -> Self {
        Self {
            config: defaults,
            defaults,
        }
    }

    pub fn config(&self) -> DetectionConfig {
        self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Whether an issue of `kind` may be recorded right now.
    pub fn allows(&self, kind: IssueKind) -> bool {
        self.config.enabled && self.config.tracks(kind)
    }

    /// Set the global switch, or flip it when `next` is `None`.
    /// Returns the new value.
    pub fn toggle_detection(&mut self, next: Option<bool>) -> bool {
        self.config.enabled = next.unwrap_or(!self.config.enabled);
        self.config.enabled
    }

    pub fn update_config(&mut self, patch: DetectionConfigPatch) -> DetectionConfig {
        if let Some(value) = patch.detect_missing_keys {
            self.config.detect_missing_keys = value;
        }
        if let Some(value) = patch.detect_fallback_usage {
            self.config.detect_fallback_usage = value;
        }
        if let Some(value) = patch.detect_hardcoded_strings {
            self.config.detect_hardcoded_strings = value;
        }
        if let Some(value) = patch.detect_rtl_issues {
            self.config.detect_rtl_issues = value;
        }
        self.config
    }

    /// Replace the whole config (used by import).
    pub fn replace(&mut self, config: DetectionConfig) {
        self.config = config;
    }

    /// Restore the factory defaults.
    pub fn restore_defaults(&mut self) {
        self.config = self.defaults;
    }
}

impl Default for DetectionController {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}
