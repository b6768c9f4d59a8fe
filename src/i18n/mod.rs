//! Locale metadata.
//!
//! - `language`: text direction and locale-code helpers
//! - `registry`: the set of locales an application ships, used as the default
//!   known-locale set for health scoring

mod language;
mod registry;

pub use language::{is_rtl_locale, primary_subtag, TextDirection, ALL_LOCALES};
pub use registry::{LocaleConfig, LocaleRegistry};
