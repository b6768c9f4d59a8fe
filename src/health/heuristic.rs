//! Heuristics deciding whether a literal string looks like untranslated,
//! user-facing text.
//!
//! The checks are approximate. A population of candidate strings will always
//! produce some false positives and false negatives; the engine accepts that
//! and does not try to correct for it downstream.

use super::issue::IssueLocation;
use regex::Regex;
use std::sync::OnceLock;

/// Strategy for classifying hardcoded-string candidates.
///
/// Implemented for plain closures so callers can swap in their own rule
/// without touching the store or controller.
pub trait TextHeuristic: Send + Sync {
    fn looks_user_facing(&self, text: &str, location: &IssueLocation) -> bool;
}

impl<F> TextHeuristic for F
where
    F: Fn(&str, &IssueLocation) -> bool + Send + Sync,
{
    fn looks_user_facing(&self, text: &str, location: &IssueLocation) -> bool {
        self(text, location)
    }
}

/// Minimum number of characters a candidate must have by default.
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Length threshold plus exclusion patterns for things that are obviously not
/// prose: class lists, identifiers, translation keys, URLs, colors and units.
#[derive(Debug, Clone)]
pub struct DefaultHeuristic {
    pub min_length: usize,
}

impl DefaultHeuristic {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for DefaultHeuristic {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}

// Exclusion patterns (compiled once)
static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
static TRANSLATION_KEY_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_OR_PATH_REGEX: OnceLock<Regex> = OnceLock::new();
static CSS_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static COLOR_OR_UNIT_REGEX: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl TextHeuristic for DefaultHeuristic {
    fn looks_user_facing(&self, text: &str, _location: &IssueLocation) -> bool {
        let text = text.trim();

        if text.chars().count() < self.min_length {
            return false;
        }
        if !text.chars().any(char::is_alphabetic) {
            return false;
        }

        !(is_code_identifier(text)
            || is_translation_key(text)
            || is_url_or_path(text)
            || is_css_class_list(text)
            || is_color_or_unit(text)
            || is_placeholder(text))
    }
}

/// camelCase, snake_case, SCREAMING_CASE and `$`-prefixed identifiers.
/// A single capitalized word ("Save") is not an identifier.
fn is_code_identifier(text: &str) -> bool {
    let regex = IDENTIFIER_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[a-z]+[A-Z][A-Za-z0-9]*|[A-Za-z0-9]*_[A-Za-z0-9_]*|\$[A-Za-z_][A-Za-z0-9_]*)$")
            .unwrap()
    });
    regex.is_match(text)
}

fn is_translation_key(text: &str) -> bool {
    let regex = TRANSLATION_KEY_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)+$").unwrap());
    regex.is_match(text)
}

fn is_url_or_path(text: &str) -> bool {
    let regex = URL_OR_PATH_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[a-z][a-z0-9+.-]*://|mailto:|tel:|/|\./|\.\./|#[A-Za-z])\S*$").unwrap()
    });
    regex.is_match(text)
}

/// Whitespace-separated utility or BEM class names, at least one of which
/// contains a `-` or `:` (so "hello world" is not a class list).
fn is_css_class_list(text: &str) -> bool {
    let regex = CSS_TOKEN_REGEX.get_or_init(|| Regex::new(r"^[a-z0-9:/\[\]._-]+$").unwrap());

    let mut has_marker = false;
    for token in text.split_whitespace() {
        if !regex.is_match(token) {
            return false;
        }
        if token.contains('-') || token.contains(':') {
            has_marker = true;
        }
    }
    has_marker
}

fn is_color_or_unit(text: &str) -> bool {
    let regex = COLOR_OR_UNIT_REGEX.get_or_init(|| {
        Regex::new(r"^(?:#[0-9a-fA-F]{3,8}|-?\d+(?:\.\d+)?(?:px|rem|em|vh|vw|ms|s|pt|%))$").unwrap()
    });
    regex.is_match(text)
}

fn is_placeholder(text: &str) -> bool {
    let regex = PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"^(?:\{\{[^}]*\}\}|\{[^}]*\}|%[sd]|\$\{[^}]*\})$").unwrap());
    regex.is_match(text)
}
