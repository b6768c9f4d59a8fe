//! Detectors: pure functions turning one observed runtime event into at most
//! one [`Issue`].
//!
//! Detectors do not consult the detection config; gating happens in the engine
//! before anything reaches the store. Given the same event (timestamp
//! included) every detector returns the same result.

use super::heuristic::TextHeuristic;
use super::issue::{full_key, Issue, IssueKind, IssueLocation, UNKNOWN};
use crate::i18n::{LocaleRegistry, ALL_LOCALES};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A translation lookup returned nothing for the requested locale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupMissEvent {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub key: String,
    /// Full key as reported by the lookup layer; used when `key` is empty
    #[serde(default)]
    pub full_key: Option<String>,
    pub locale: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub component_name: Option<String>,
    #[serde(default)]
    pub component_type: Option<String>,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// The requested locale had no value and another locale's value was shown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEvent {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub full_key: Option<String>,
    /// Locale that was requested
    pub locale: String,
    /// Locale whose value was substituted; the canonical locale when absent
    #[serde(default)]
    pub fallback_locale: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub component_name: Option<String>,
    #[serde(default)]
    pub component_type: Option<String>,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// A literal string found in rendered output, supplied by an external scanner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardcodedStringEvent {
    pub text: String,
    #[serde(default)]
    pub location: IssueLocation,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// A component rendered under a locale, and whether its styling respected the
/// locale's writing direction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtlObservation {
    pub locale: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub component_name: Option<String>,
    #[serde(default)]
    pub component_type: Option<String>,
    /// Offending physical property, e.g. "margin-left" or "text-align: left"
    #[serde(default)]
    pub property: Option<String>,
    /// Whether the component used logical (start/end) styling
    #[serde(default)]
    pub direction_aware: bool,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// Any event a detector can consume, one variant per issue kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DetectionEvent {
    MissingTranslation(LookupMissEvent),
    FallbackUsed(FallbackEvent),
    HardcodedString(HardcodedStringEvent),
    RtlViolation(RtlObservation),
}

/// Inputs shared by all detectors that are not part of an individual event.
pub struct DetectorContext<'a> {
    pub heuristic: &'a dyn TextHeuristic,
    /// Locale assumed for fallback events that do not name one
    pub fallback_locale: &'a str,
    /// Source of each locale's writing direction
    pub registry: &'a LocaleRegistry,
}

impl DetectionEvent {
    pub fn kind(&self) -> IssueKind {
        match self {
            DetectionEvent::MissingTranslation(_) => IssueKind::MissingTranslation,
            DetectionEvent::FallbackUsed(_) => IssueKind::FallbackUsed,
            DetectionEvent::HardcodedString(_) => IssueKind::HardcodedString,
            DetectionEvent::RtlViolation(_) => IssueKind::RtlViolation,
        }
    }

    /// Locale and full key this event exposes, for coverage accounting.
    /// Only lookup events carry a translation key.
    pub fn observed_key(&self) -> Option<(&str, String)> {
        match self {
            DetectionEvent::MissingTranslation(event) => {
                let key = resolve_full_key(&event.namespace, &event.key, &event.full_key);
                Some((event.locale.as_str(), key))
            }
            DetectionEvent::FallbackUsed(event) => {
                let key = resolve_full_key(&event.namespace, &event.key, &event.full_key);
                Some((event.locale.as_str(), key))
            }
            DetectionEvent::HardcodedString(_) | DetectionEvent::RtlViolation(_) => None,
        }
    }

    pub fn detect(&self, ctx: &DetectorContext<'_>) -> Option<Issue> {
        match self {
            DetectionEvent::MissingTranslation(event) => detect_missing_translation(event),
            DetectionEvent::FallbackUsed(event) => {
                detect_fallback_usage(event, ctx.fallback_locale)
            }
            DetectionEvent::HardcodedString(event) => {
                detect_hardcoded_string(event, ctx.heuristic)
            }
            DetectionEvent::RtlViolation(event) => detect_rtl_violation(event, ctx.registry),
        }
    }
}

/// Split the reported identifier into (namespace, key). An explicit `key`
/// wins; otherwise the reported full key is used as-is with no namespace.
fn resolve_key<'a>(
    namespace: &'a Option<String>,
    key: &'a str,
    reported_full_key: &'a Option<String>,
) -> (Option<&'a str>, &'a str) {
    if key.trim().is_empty() {
        if let Some(full) = reported_full_key.as_deref() {
            return (None, full);
        }
    }
    (namespace.as_deref(), key)
}

fn resolve_full_key(
    namespace: &Option<String>,
    key: &str,
    reported_full_key: &Option<String>,
) -> String {
    let (namespace, key) = resolve_key(namespace, key, reported_full_key);
    full_key(namespace, key)
}

pub fn detect_missing_translation(event: &LookupMissEvent) -> Option<Issue> {
    let (namespace, key) = resolve_key(&event.namespace, &event.key, &event.full_key);
    let location = IssueLocation::new(event.route.clone())
        .with_component(event.component_name.clone(), event.component_type.clone());

    let issue = Issue::new(
        IssueKind::MissingTranslation,
        &event.locale,
        namespace,
        key,
        location,
        event.observed_at,
    )
    .ok()?;

    let message = format!(
        "Missing translation for '{}' in locale '{}'",
        issue.full_key, issue.locale
    );
    Some(issue.with_message(message))
}

pub fn detect_fallback_usage(event: &FallbackEvent, default_fallback: &str) -> Option<Issue> {
    let fallback_locale = event
        .fallback_locale
        .as_deref()
        .map(str::trim)
        .filter(|locale| !locale.is_empty())
        .unwrap_or(default_fallback);

    // Falling back to the same locale is not a fallback.
    if fallback_locale == event.locale.trim() {
        return None;
    }

    let (namespace, key) = resolve_key(&event.namespace, &event.key, &event.full_key);
    let location = IssueLocation::new(event.route.clone())
        .with_component(event.component_name.clone(), event.component_type.clone());

    let issue = Issue::new(
        IssueKind::FallbackUsed,
        &event.locale,
        namespace,
        key,
        location,
        event.observed_at,
    )
    .ok()?;

    let message = format!(
        "'{}' in locale '{}' fell back to '{}'",
        issue.full_key, issue.locale, fallback_locale
    );
    Some(
        issue
            .with_fallback_locale(fallback_locale)
            .with_message(message),
    )
}

/// Hardcoded strings are reported once per route for every locale, keyed by
/// the trimmed text itself.
pub fn detect_hardcoded_string(
    event: &HardcodedStringEvent,
    heuristic: &dyn TextHeuristic,
) -> Option<Issue> {
    if !heuristic.looks_user_facing(&event.text, &event.location) {
        return None;
    }

    let text = event.text.trim();
    let issue = Issue::new(
        IssueKind::HardcodedString,
        ALL_LOCALES,
        None,
        text,
        event.location.clone(),
        event.observed_at,
    )
    .ok()?;

    let message = format!(
        "Possible hardcoded string \"{}\" in {}",
        text,
        event.location.component_name_or_unknown()
    );
    Some(issue.with_text(text).with_message(message))
}

/// Flag a direction-unaware layout property under a right-to-left locale.
/// Registered locales use their configured direction; anything else falls
/// back to the language subtag.
pub fn detect_rtl_violation(event: &RtlObservation, registry: &LocaleRegistry) -> Option<Issue> {
    if event.direction_aware || !registry.direction(&event.locale).is_rtl() {
        return None;
    }

    let location = IssueLocation::new(event.route.clone())
        .with_component(event.component_name.clone(), event.component_type.clone());
    let property = event
        .property
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("direction");
    let key = format!("{}:{}", location.component_name_or_unknown(), property);

    let issue = Issue::new(
        IssueKind::RtlViolation,
        &event.locale,
        None,
        &key,
        location,
        event.observed_at,
    )
    .ok()?;

    let message = format!(
        "{} uses physical '{}' under right-to-left locale '{}'",
        issue.location.component_name_or_unknown(),
        property,
        issue.locale
    );
    Some(issue.with_message(message))
}

/// Route reported by an event, for logging.
pub fn event_route(event: &DetectionEvent) -> &str {
    let route = match event {
        DetectionEvent::MissingTranslation(e) => e.route.as_deref(),
        DetectionEvent::FallbackUsed(e) => e.route.as_deref(),
        DetectionEvent::HardcodedString(e) => e.location.route.as_deref(),
        DetectionEvent::RtlViolation(e) => e.route.as_deref(),
    };
    route.unwrap_or(UNKNOWN)
}
