//! Health scoring.
//!
//! `compute_health` is a pure function of the current issues, the known
//! locales and the coverage counts. Snapshots are always rebuilt from scratch,
//! never patched.

use super::coverage::KeyCoverage;
use super::issue::{Issue, IssueKind, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Best possible score.
pub const MAX_SCORE: u8 = 100;

/// Penalty each open issue subtracts from its locale's score, by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            high: 10,
            medium: 5,
            low: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleHealth {
    pub score: u8,
    pub open_issue_count: usize,
    pub total_keys_observed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub overall_score: u8,
    pub per_locale: BTreeMap<String, LocaleHealth>,
    pub open_issues_by_kind: BTreeMap<IssueKind, usize>,
    pub open_issues_by_severity: BTreeMap<Severity, usize>,
    pub total_open_issues: usize,
    pub computed_at: DateTime<Utc>,
    /// True when the engine is switched off by its feature gate
    #[serde(default)]
    pub disabled: bool,
}

impl HealthSnapshot {
    /// The fixed snapshot reported while the engine is gated off.
    pub fn disabled(now: DateTime<Utc>) -> Self {
        Self {
            overall_score: MAX_SCORE,
            per_locale: BTreeMap::new(),
            open_issues_by_kind: BTreeMap::new(),
            open_issues_by_severity: BTreeMap::new(),
            total_open_issues: 0,
            computed_at: now,
            disabled: true,
        }
    }
}

/// Score every known locale and the whole application.
///
/// - An open issue counts against its own locale; issues whose locale is
///   "all" count against every known locale.
/// - A locale's score is `100 - sum(weights)`, floored at zero.
/// - The overall score is the rounded mean of the locale scores, or 100 when
///   there are no known locales.
pub fn compute_health(
    issues: &[Issue],
    known_locales: &[String],
    coverage: &KeyCoverage,
    weights: &SeverityWeights,
    now: DateTime<Utc>,
) -> HealthSnapshot {
    let open: Vec<&Issue> = issues.iter().filter(|issue| issue.is_open()).collect();

    let mut per_locale = BTreeMap::new();
    for locale in known_locales {
        if per_locale.contains_key(locale) {
            continue;
        }

        let mut penalty: u32 = 0;
        let mut open_issue_count = 0;
        for issue in open.iter().filter(|issue| issue.applies_to(locale)) {
            penalty = penalty.saturating_add(weights.weight(issue.severity));
            open_issue_count += 1;
        }

        per_locale.insert(
            locale.clone(),
            LocaleHealth {
                score: score_from_penalty(penalty),
                open_issue_count,
                total_keys_observed: coverage.total_for(locale),
            },
        );
    }

    let overall_score = if per_locale.is_empty() {
        MAX_SCORE
    } else {
        let sum: u32 = per_locale.values().map(|health| health.score as u32).sum();
        let mean = sum as f64 / per_locale.len() as f64;
        mean.round() as u8
    };

    let mut open_issues_by_kind = BTreeMap::new();
    let mut open_issues_by_severity = BTreeMap::new();
    for issue in &open {
        *open_issues_by_kind.entry(issue.kind).or_insert(0) += 1;
        *open_issues_by_severity.entry(issue.severity).or_insert(0) += 1;
    }

    HealthSnapshot {
        overall_score,
        per_locale,
        open_issues_by_kind,
        open_issues_by_severity,
        total_open_issues: open.len(),
        computed_at: now,
        disabled: false,
    }
}

fn score_from_penalty(penalty: u32) -> u8 {
    (MAX_SCORE as u32).saturating_sub(penalty) as u8
}
