//! Integration tests for the translation health engine
//!
//! These tests drive the engine through its public API only: events in,
//! issues and health snapshots out, plus export/import between engines.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use translation_health::{
    config::Config,
    error::HealthError,
    health::{
        compute_health, DetectionConfig, DetectionConfigPatch, DetectionEvent, EngineSettings,
        FallbackEvent, HardcodedStringEvent, HealthEngine, Issue, IssueFilter, IssueKind,
        IssueLocation, IssueStatus, KeyCoverage, LookupMissEvent, RtlObservation,
        SeverityWeights, UNKNOWN,
    },
    i18n::LocaleRegistry,
};

// ==================== Test Helpers ====================

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn engine_for(locales: &[&str]) -> HealthEngine {
    HealthEngine::new(EngineSettings {
        known_locales: locales.iter().map(|l| l.to_string()).collect(),
        ..EngineSettings::default()
    })
}

fn miss(namespace: &str, key: &str, locale: &str, route: &str) -> DetectionEvent {
    DetectionEvent::MissingTranslation(LookupMissEvent {
        namespace: Some(namespace.to_string()),
        key: key.to_string(),
        full_key: None,
        locale: locale.to_string(),
        route: Some(route.to_string()),
        component_name: None,
        component_type: None,
        observed_at: at(0),
    })
}

fn common_save_miss() -> DetectionEvent {
    miss("common", "save", "en", "/dashboard")
}

fn all_filter() -> IssueFilter {
    IssueFilter::default()
}

// ==================== Scenario Tests ====================

#[test]
fn test_single_miss_scenario() {
    let engine = engine_for(&["en"]);
    engine.handle_event(common_save_miss());

    let issues = engine.issues(&all_filter());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].full_key, "common.save");
    assert_eq!(issues[0].occurrence_count, 1);
    assert_eq!(issues[0].status, IssueStatus::Open);

    let health = engine.health();
    assert_eq!(health.per_locale["en"].score, 90);
    assert_eq!(health.overall_score, 90);
}

#[test]
fn test_repeated_miss_scenario() {
    let engine = engine_for(&["en"]);
    engine.handle_event(common_save_miss());
    engine.handle_event(common_save_miss());

    let issues = engine.issues(&all_filter());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].occurrence_count, 2);

    // Score depends on open issues, not on how often they occurred
    let health = engine.health();
    assert_eq!(health.per_locale["en"].score, 90);
    assert_eq!(health.overall_score, 90);
}

#[test]
fn test_resolve_then_recompute_scenario() {
    let engine = engine_for(&["en"]);
    let id = engine.handle_event(common_save_miss()).unwrap().id;
    let observed_before = engine.health().per_locale["en"].total_keys_observed;

    engine.resolve(&id);

    let health = engine.health();
    assert_eq!(health.per_locale["en"].score, 100);
    assert_eq!(health.per_locale["en"].total_keys_observed, observed_before);
    assert!(health.per_locale["en"].total_keys_observed >= 1);
}

#[test]
fn test_malformed_import_scenario() {
    let engine = engine_for(&["en"]);
    engine.handle_event(common_save_miss());
    let before = engine.issues(&all_filter());

    let mut document: serde_json::Value =
        serde_json::from_str(&engine.export_data().unwrap()).unwrap();
    document["issues"][0]["kind"] = serde_json::json!("not-a-real-kind");

    let result = engine.import_data(&document.to_string());
    let err = result.unwrap_err();
    assert!(matches!(err, HealthError::Import(_)));
    assert!(err.to_string().contains("not-a-real-kind"));
    assert_eq!(engine.issues(&all_filter()), before);
}

// ==================== Property Tests ====================

#[test]
fn test_idempotent_detection_across_kinds() {
    let engine = HealthEngine::new(EngineSettings {
        default_config: DetectionConfig {
            detect_hardcoded_strings: true,
            ..DetectionConfig::default()
        },
        ..EngineSettings::default()
    });

    let events = || {
        vec![
            common_save_miss(),
            DetectionEvent::FallbackUsed(FallbackEvent {
                namespace: Some("common".to_string()),
                key: "cancel".to_string(),
                full_key: None,
                locale: "es".to_string(),
                fallback_locale: Some("en".to_string()),
                route: Some("/settings".to_string()),
                component_name: None,
                component_type: None,
                observed_at: at(0),
            }),
            DetectionEvent::HardcodedString(HardcodedStringEvent {
                text: "Save changes".to_string(),
                location: IssueLocation::new(Some("/settings".to_string())),
                observed_at: at(0),
            }),
            DetectionEvent::RtlViolation(RtlObservation {
                locale: "ar".to_string(),
                route: Some("/inbox".to_string()),
                component_name: Some("Sidebar".to_string()),
                component_type: None,
                property: Some("margin-left".to_string()),
                direction_aware: false,
                observed_at: at(0),
            }),
        ]
    };

    for event in events().into_iter().chain(events()) {
        assert!(engine.handle_event(event).is_some());
    }

    let issues = engine.issues(&all_filter());
    assert_eq!(issues.len(), 4);
    assert!(issues.iter().all(|issue| issue.occurrence_count == 2));
}

#[test]
fn test_clear_all_keeps_observed_keys() {
    let engine = engine_for(&["en", "es"]);
    engine.handle_event(common_save_miss());
    engine.handle_event(miss("common", "cancel", "en", "/dashboard"));
    engine.observe_lookup("es", "common.save");

    let before = engine.health();
    engine.clear_all();
    let after = engine.health();

    for locale in ["en", "es"] {
        assert_eq!(
            after.per_locale[locale].total_keys_observed,
            before.per_locale[locale].total_keys_observed
        );
    }
    assert_eq!(after.per_locale["en"].total_keys_observed, 2);
}

#[test]
fn test_disabled_detection_records_nothing() {
    let engine = engine_for(&["en", "ar"]);
    engine.toggle_detection(Some(false));

    engine.handle_event(common_save_miss());
    engine.handle_event(DetectionEvent::RtlViolation(RtlObservation {
        locale: "ar".to_string(),
        route: None,
        component_name: None,
        component_type: None,
        property: None,
        direction_aware: false,
        observed_at: at(0),
    }));

    assert!(engine.issues(&all_filter()).is_empty());
    assert_eq!(engine.health().overall_score, 100);
}

#[test]
fn test_export_import_round_trip() {
    let source = engine_for(&["en", "es"]);
    source.handle_event(common_save_miss());
    source.handle_event(common_save_miss());
    let id = source
        .handle_event(miss("nav", "home", "es", "/"))
        .unwrap()
        .id;
    source.ignore(&id);
    source.update_config(DetectionConfigPatch {
        detect_fallback_usage: Some(false),
        ..DetectionConfigPatch::default()
    });

    let exported = source.export_data().unwrap();

    let target = engine_for(&["en", "es"]);
    target.import_data(&exported).unwrap();

    assert_eq!(target.issues(&all_filter()), source.issues(&all_filter()));
    assert_eq!(target.config(), source.config());
    assert_eq!(target.health().per_locale, source.health().per_locale);
    assert_eq!(target.health().overall_score, source.health().overall_score);
}

proptest! {
    #[test]
    fn prop_scores_stay_in_range(
        counts in prop::collection::vec((0usize..4, 0usize..30), 0..12),
        high in 0u32..50,
        medium in 0u32..50,
        low in 0u32..50,
    ) {
        let kinds = [
            IssueKind::MissingTranslation,
            IssueKind::FallbackUsed,
            IssueKind::RtlViolation,
        ];
        let locales = vec!["en".to_string(), "ar".to_string()];

        let mut issues = Vec::new();
        for (i, (kind_index, n)) in counts.iter().enumerate() {
            for j in 0..*n {
                let locale = &locales[(i + j) % locales.len()];
                let issue = Issue::new(
                    kinds[kind_index % kinds.len()],
                    locale,
                    Some("ns"),
                    &format!("key{}_{}", i, j),
                    IssueLocation::default(),
                    at(0),
                )
                .unwrap();
                issues.push(issue);
            }
        }

        let weights = SeverityWeights { high, medium, low };
        let snapshot = compute_health(&issues, &locales, &KeyCoverage::new(), &weights, at(0));

        prop_assert!(snapshot.overall_score <= 100);
        for health in snapshot.per_locale.values() {
            prop_assert!(health.score <= 100);
        }
    }
}

// ==================== Feature Gate Tests ====================

#[test]
fn test_gated_engine_from_config() {
    let config = Config::from_lookup(&LocaleRegistry::default(), |name| match name {
        "HEALTH_ENGINE_ENABLED" => Some("false".to_string()),
        _ => None,
    })
    .unwrap();
    let engine = HealthEngine::with_heuristic(config.engine_settings(), config.heuristic());

    assert!(engine.handle_event(common_save_miss()).is_none());
    assert!(engine.issues(&all_filter()).is_empty());
    assert!(!engine.config().enabled);

    let health = engine.health();
    assert!(health.disabled);
    assert_eq!(health.overall_score, 100);
}

// ==================== Provenance Tests ====================

#[test]
fn test_unknown_provenance_is_tolerated() {
    let engine = engine_for(&["en"]);
    let issue = engine
        .handle_event(DetectionEvent::MissingTranslation(LookupMissEvent {
            namespace: None,
            key: "title".to_string(),
            full_key: None,
            locale: "en".to_string(),
            route: None,
            component_name: None,
            component_type: None,
            observed_at: at(0),
        }))
        .unwrap();

    assert_eq!(issue.full_key, "title");
    assert_eq!(issue.location.route_or_unknown(), UNKNOWN);
    assert_eq!(issue.location.component_name_or_unknown(), UNKNOWN);
    assert_eq!(issue.location.component_type_or_unknown(), UNKNOWN);
}

#[test]
fn test_events_deserialize_from_reporter_json() {
    let engine = engine_for(&["en"]);
    let event: DetectionEvent = serde_json::from_value(serde_json::json!({
        "type": "missing-translation",
        "fullKey": "common.save",
        "namespace": "common",
        "key": "save",
        "locale": "en",
        "route": "/dashboard"
    }))
    .unwrap();

    let issue = engine.handle_event(event).unwrap();
    assert_eq!(issue.full_key, "common.save");
    assert_eq!(issue.kind, IssueKind::MissingTranslation);
}
