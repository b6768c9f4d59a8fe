//! Error types for the translation health engine.
//!
//! Only two things can go wrong inside the engine: an issue fails its
//! construction checks, or an import document is rejected. Lookups of unknown
//! issue ids are not errors and never surface here.

use thiserror::Error;

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, HealthError>;

#[derive(Error, Debug)]
pub enum HealthError {
    /// An issue could not be constructed (empty locale, empty key, ...)
    #[error("Invalid issue: {0}")]
    InvalidIssue(String),

    /// An import document was rejected; nothing was changed
    #[error("Import rejected: {0}")]
    Import(#[from] ImportError),

    /// The feature gate is off, so the engine does not accept imports
    #[error("Translation health engine is disabled")]
    EngineDisabled,

    /// Serializing an export document failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why an import document was rejected.
///
/// Every variant carries a reason that can be shown to an operator as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Not valid JSON at all
    #[error("document is not valid JSON: {0}")]
    Syntax(String),

    /// Valid JSON but the wrong shape: missing fields, unknown issue kinds,
    /// malformed timestamps
    #[error("document structure is invalid: {0}")]
    Structure(String),

    /// An issue parsed but violates an issue invariant
    #[error("issue at index {index} is invalid: {reason}")]
    InvalidIssue { index: usize, reason: String },

    /// Two issues share the same fingerprint
    #[error("duplicate issue id '{0}'")]
    DuplicateIssue(String),
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => ImportError::Syntax(err.to_string()),
            Category::Data => ImportError::Structure(err.to_string()),
        }
    }
}
