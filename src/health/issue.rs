//! Issue model: one tracked localization defect.
//!
//! Issues are identified by a fingerprint derived from
//! `(kind, full key, locale, route)`, so the same defect observed twice maps to
//! the same id. Everything except `status`, `last_seen_at` and
//! `occurrence_count` is fixed at construction.

use crate::error::{HealthError, Result};
use crate::i18n::ALL_LOCALES;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Placeholder for provenance that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Length of the hex fingerprint used as issue id.
const FINGERPRINT_LEN: usize = 16;

/// Defect classes the engine tracks.
///
/// This is a closed set: import documents carrying any other value are
/// rejected rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    MissingTranslation,
    FallbackUsed,
    HardcodedString,
    RtlViolation,
}

impl IssueKind {
    pub const ALL: [IssueKind; 4] = [
        IssueKind::MissingTranslation,
        IssueKind::FallbackUsed,
        IssueKind::HardcodedString,
        IssueKind::RtlViolation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingTranslation => "missing-translation",
            IssueKind::FallbackUsed => "fallback-used",
            IssueKind::HardcodedString => "hardcoded-string",
            IssueKind::RtlViolation => "rtl-violation",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::MissingTranslation => Severity::High,
            IssueKind::FallbackUsed => Severity::Medium,
            IssueKind::HardcodedString => Severity::Low,
            IssueKind::RtlViolation => Severity::Medium,
        }
    }

    /// Kinds that are not tied to a translation key, so an empty full key
    /// is acceptable.
    pub fn is_locale_agnostic(&self) -> bool {
        matches!(self, IssueKind::HardcodedString)
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Resolved,
    Ignored,
}

/// Where a defect was observed. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLocation {
    /// Route the defect was seen on; part of the fingerprint
    #[serde(default)]
    pub route: Option<String>,

    #[serde(default)]
    pub component_name: Option<String>,

    #[serde(default)]
    pub component_type: Option<String>,
}

impl IssueLocation {
    pub fn new(route: Option<String>) -> Self {
        Self {
            route,
            ..Self::default()
        }
    }

    pub fn with_component(
        mut self,
        component_name: Option<String>,
        component_type: Option<String>,
    ) -> Self {
        self.component_name = component_name;
        self.component_type = component_type;
        self
    }

    /// Route used for fingerprinting; blank routes collapse to "unknown".
    pub fn route_or_unknown(&self) -> &str {
        non_blank(self.route.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn component_name_or_unknown(&self) -> &str {
        non_blank(self.component_name.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn component_type_or_unknown(&self) -> &str {
        non_blank(self.component_type.as_deref()).unwrap_or(UNKNOWN)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Join a namespace and key into the full key (`namespace.key`, or just
/// `key` when there is no namespace).
pub fn full_key(namespace: Option<&str>, key: &str) -> String {
    let key = key.trim();
    match non_blank(namespace) {
        Some(ns) if !key.is_empty() => format!("{}.{}", ns, key),
        _ => key.to_string(),
    }
}

/// Deterministic issue id for a `(kind, full key, locale, route)` tuple.
pub fn fingerprint(kind: IssueKind, full_key: &str, locale: &str, route: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(full_key.as_bytes());
    hasher.update([0u8]);
    hasher.update(locale.as_bytes());
    hasher.update([0u8]);
    hasher.update(route.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub locale: String,
    #[serde(default)]
    pub namespace: Option<String>,
    pub key: String,
    pub full_key: String,
    pub location: IssueLocation,
    pub status: IssueStatus,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub occurrence_count: u32,

    /// Human-readable description for triage views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Locale whose value was substituted (fallback-used only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_locale: Option<String>,

    /// Offending text (hardcoded-string only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Issue {
    /// Construct a new open issue observed once at `observed_at`.
    pub fn new(
        kind: IssueKind,
        locale: &str,
        namespace: Option<&str>,
        key: &str,
        location: IssueLocation,
        observed_at: DateTime<Utc>,
    ) -> Result<Issue> {
        let locale = locale.trim();
        let full_key = full_key(namespace, key);

        if locale.is_empty() {
            return Err(HealthError::InvalidIssue(
                "locale must not be empty".to_string(),
            ));
        }
        if full_key.is_empty() && !kind.is_locale_agnostic() {
            return Err(HealthError::InvalidIssue(format!(
                "{} issues require a translation key",
                kind
            )));
        }

        Ok(Issue {
            id: fingerprint(kind, &full_key, locale, location.route_or_unknown()),
            kind,
            severity: kind.severity(),
            locale: locale.to_string(),
            namespace: non_blank(namespace).map(str::to_string),
            key: key.trim().to_string(),
            full_key,
            location,
            status: IssueStatus::Open,
            first_seen_at: observed_at,
            last_seen_at: observed_at,
            occurrence_count: 1,
            message: None,
            fallback_locale: None,
            text: None,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_fallback_locale(mut self, fallback_locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(fallback_locale.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Recompute the fingerprint from the identifying fields.
    pub fn fingerprint(&self) -> String {
        fingerprint(
            self.kind,
            &self.full_key,
            &self.locale,
            self.location.route_or_unknown(),
        )
    }

    pub fn is_open(&self) -> bool {
        self.status == IssueStatus::Open
    }

    /// Whether this issue weighs on the health of `locale`.
    pub fn applies_to(&self, locale: &str) -> bool {
        self.locale == locale || self.locale == ALL_LOCALES
    }

    /// Check the invariants of an issue that did not come through
    /// [`Issue::new`], e.g. one read from an import document.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.locale.trim().is_empty() {
            return Err("locale must not be empty".to_string());
        }
        if self.locale != self.locale.trim() {
            return Err(format!("locale '{}' has surrounding whitespace", self.locale));
        }
        if self.key != self.key.trim() {
            return Err(format!("key '{}' has surrounding whitespace", self.key));
        }
        if let Some(namespace) = self.namespace.as_deref() {
            if namespace.trim().is_empty() || namespace != namespace.trim() {
                return Err(format!("namespace '{}' is blank or untrimmed", namespace));
            }
        }
        if self.full_key.is_empty() && !self.kind.is_locale_agnostic() {
            return Err(format!("{} issues require a translation key", self.kind));
        }
        if self.full_key != full_key(self.namespace.as_deref(), &self.key) {
            return Err(format!(
                "fullKey '{}' does not match namespace and key",
                self.full_key
            ));
        }
        if self.severity != self.kind.severity() {
            return Err(format!(
                "severity {:?} does not match kind {}",
                self.severity, self.kind
            ));
        }
        if self.id != self.fingerprint() {
            return Err(format!(
                "id '{}' is not the fingerprint of its kind, key, locale and route",
                self.id
            ));
        }
        if self.occurrence_count == 0 {
            return Err("occurrenceCount must be at least 1".to_string());
        }
        if self.last_seen_at < self.first_seen_at {
            return Err("lastSeenAt is earlier than firstSeenAt".to_string());
        }
        Ok(())
    }
}
