//! Locale codes and text direction.
//!
//! Locale strings arrive from the routing layer as free-form codes such as
//! `en`, `ar-EG` or `zh_Hant`. This module only looks at the primary language
//! subtag; it does not validate the rest of the code.

use serde::{Deserialize, Serialize};

/// Locale value used by issues that apply to every locale
/// (e.g. hardcoded strings, which are never translated at all).
pub const ALL_LOCALES: &str = "all";

/// Primary language subtags written right-to-left.
const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ur", "yi", "ps", "dv", "ckb"];

/// Writing direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Resolve the writing direction from a locale code.
    ///
    /// Unknown or empty codes are treated as left-to-right.
    pub fn for_locale(code: &str) -> TextDirection {
        let primary = primary_subtag(code);
        if RTL_LANGUAGES.iter().any(|lang| lang.eq_ignore_ascii_case(primary)) {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, TextDirection::Rtl)
    }
}

/// Primary language subtag of a locale code (`"ar"` for `"ar-EG"`).
pub fn primary_subtag(code: &str) -> &str {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
}

/// Check whether a locale is written right-to-left.
pub fn is_rtl_locale(code: &str) -> bool {
    TextDirection::for_locale(code).is_rtl()
}
