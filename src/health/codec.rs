//! Export/import document format.
//!
//! ```json
//! {
//!   "issues": [ { "id": "...", "kind": "missing-translation", ... } ],
//!   "config": { "enabled": true, "detectMissingKeys": true, ... },
//!   "exportedAt": "2024-01-15T10:30:00Z"
//! }
//! ```
//!
//! Timestamps are RFC 3339 strings in UTC throughout.

use super::controller::DetectionConfig;
use super::issue::Issue;
use crate::error::ImportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub issues: Vec<Issue>,
    pub config: DetectionConfig,
    pub exported_at: DateTime<Utc>,
}

impl ExportDocument {
    pub fn new(issues: Vec<Issue>, config: DetectionConfig, exported_at: DateTime<Utc>) -> Self {
        Self {
            issues,
            config,
            exported_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and fully validate a document.
    ///
    /// The first problem found is reported; a document is either accepted as
    /// a whole or rejected as a whole.
    pub fn parse(text: &str) -> Result<ExportDocument, ImportError> {
        let document: ExportDocument = serde_json::from_str(text)?;
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<(), ImportError> {
        let mut seen = HashSet::new();
        for (index, issue) in self.issues.iter().enumerate() {
            issue
                .validate()
                .map_err(|reason| ImportError::InvalidIssue { index, reason })?;
            if !seen.insert(issue.id.as_str()) {
                return Err(ImportError::DuplicateIssue(issue.id.clone()));
            }
        }
        Ok(())
    }
}
