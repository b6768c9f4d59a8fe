//! Issue store: every known issue, keyed by fingerprint.
//!
//! The store itself is not synchronized. The engine owns it behind a single
//! mutex so that read-modify-write sequences never interleave.

use super::issue::{Issue, IssueKind, IssueStatus};
use serde::Deserialize;
use std::collections::HashMap;

/// What `record` did with an incoming issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First time this fingerprint was seen
    Inserted,
    /// Merged into an existing record
    Coalesced,
    /// Merged into a resolved record, which is open again
    Reopened,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub issue: Issue,
    pub outcome: RecordOutcome,
}

/// Filter for [`IssueStore::list`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssueFilter {
    #[serde(default)]
    pub kind: Option<IssueKind>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub status: Option<IssueStatus>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        self.kind.map_or(true, |kind| issue.kind == kind)
            && self
                .locale
                .as_deref()
                .map_or(true, |locale| issue.locale == locale)
            && self.status.map_or(true, |status| issue.status == status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IssueStore {
    issues: HashMap<String, Issue>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an issue, or merge it into the record with the same fingerprint.
    ///
    /// Merging bumps `occurrence_count` and widens the seen-at window; it never
    /// moves `last_seen_at` backwards, so out-of-order events are harmless.
    /// Resolved issues reopen when seen again; ignored issues stay ignored.
    pub fn record(&mut self, issue: Issue) -> Recorded {
        match self.issues.get_mut(&issue.id) {
            Some(existing) => {
                existing.occurrence_count = existing.occurrence_count.saturating_add(1);
                existing.last_seen_at = existing.last_seen_at.max(issue.last_seen_at);
                existing.first_seen_at = existing.first_seen_at.min(issue.first_seen_at);
                if existing.message.is_none() {
                    existing.message = issue.message;
                }
                if existing.fallback_locale.is_none() {
                    existing.fallback_locale = issue.fallback_locale;
                }

                let outcome = if existing.status == IssueStatus::Resolved {
                    existing.status = IssueStatus::Open;
                    RecordOutcome::Reopened
                } else {
                    RecordOutcome::Coalesced
                };

                Recorded {
                    issue: existing.clone(),
                    outcome,
                }
            }
            None => {
                let mut issue = issue;
                issue.status = IssueStatus::Open;
                issue.occurrence_count = issue.occurrence_count.max(1);
                self.issues.insert(issue.id.clone(), issue.clone());

                Recorded {
                    issue,
                    outcome: RecordOutcome::Inserted,
                }
            }
        }
    }

    /// Mark an issue resolved. Unknown ids are a no-op and return `None`.
    pub fn resolve(&mut self, id: &str) -> Option<Issue> {
        self.set_status(id, IssueStatus::Resolved)
    }

    /// Mark an issue ignored. Unknown ids are a no-op and return `None`.
    pub fn ignore(&mut self, id: &str) -> Option<Issue> {
        self.set_status(id, IssueStatus::Ignored)
    }

    /// Move an issue back to open. Unknown ids are a no-op.
    pub fn reopen(&mut self, id: &str) -> Option<Issue> {
        self.set_status(id, IssueStatus::Open)
    }

    fn set_status(&mut self, id: &str, status: IssueStatus) -> Option<Issue> {
        let issue = self.issues.get_mut(id)?;
        issue.status = status;
        Some(issue.clone())
    }

    /// Remove every resolved issue. Returns how many were removed.
    pub fn clear_resolved(&mut self) -> usize {
        let before = self.issues.len();
        self.issues
            .retain(|_, issue| issue.status != IssueStatus::Resolved);
        before - self.issues.len()
    }

    /// Remove every issue. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.issues.len();
        self.issues.clear();
        removed
    }

    /// Replace the whole contents. Callers validate beforehand.
    pub fn replace_all(&mut self, issues: Vec<Issue>) {
        self.issues = issues
            .into_iter()
            .map(|issue| (issue.id.clone(), issue))
            .collect();
    }

    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.get(id)
    }

    /// Matching issues, most recently seen first (ties broken by id).
    pub fn list(&self, filter: &IssueFilter) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .issues
            .values()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect();
        issues.sort_by(|a, b| {
            b.last_seen_at
                .cmp(&a.last_seen_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        issues
    }

    /// Every issue, in list order.
    pub fn snapshot(&self) -> Vec<Issue> {
        self.list(&IssueFilter::default())
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.issues.values().filter(|issue| issue.is_open()).count()
    }
}
