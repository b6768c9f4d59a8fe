//! Locale registry: the locales an application ships translations for.
//!
//! The registry provides the default known-locale set used for health scoring
//! and the canonical locale that fallback lookups resolve to. It is an
//! ordinary value, constructed once at startup and handed to whoever needs it.

use super::language::TextDirection;
use serde::Serialize;

/// Metadata for one supported locale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleConfig {
    /// Locale code (e.g. "en", "ar")
    pub code: &'static str,

    /// English name of the locale
    pub name: &'static str,

    /// Name of the locale in its own language
    pub native_name: &'static str,

    /// Writing direction
    pub direction: TextDirection,

    /// Whether this is the source locale every other locale falls back to
    pub is_canonical: bool,

    /// Whether this locale is scored
    pub enabled: bool,
}

impl LocaleConfig {
    pub fn new(code: &'static str, name: &'static str, native_name: &'static str) -> Self {
        Self {
            code,
            name,
            native_name,
            direction: TextDirection::Ltr,
            is_canonical: false,
            enabled: true,
        }
    }

    pub fn rtl(mut self) -> Self {
        self.direction = TextDirection::Rtl;
        self
    }

    pub fn canonical(mut self) -> Self {
        self.is_canonical = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

impl LocaleRegistry {
    pub fn new(locales: Vec<LocaleConfig>) -> Self {
        Self { locales }
    }

    /// Get a locale configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// All enabled locales, in registration order.
    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    /// All locales, including disabled ones.
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    /// Codes of the enabled locales; the default known-locale set.
    pub fn enabled_codes(&self) -> Vec<String> {
        self.list_enabled()
            .into_iter()
            .map(|locale| locale.code.to_string())
            .collect()
    }

    /// The canonical locale, if exactly one is registered.
    pub fn canonical(&self) -> Option<&LocaleConfig> {
        let mut canonical = self.locales.iter().filter(|locale| locale.is_canonical);
        match (canonical.next(), canonical.next()) {
            (Some(locale), None) => Some(locale),
            _ => None,
        }
    }

    /// Writing direction of a locale, falling back to its language subtag
    /// when the code is not registered (e.g. "ar-EG").
    pub fn direction(&self, code: &str) -> TextDirection {
        self.get_by_code(code)
            .map(|locale| locale.direction)
            .unwrap_or_else(|| TextDirection::for_locale(code))
    }
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new(default_locales())
    }
}

fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig::new("en", "English", "English").canonical(),
        LocaleConfig::new("es", "Spanish", "Español"),
        LocaleConfig::new("fr", "French", "Français"),
        LocaleConfig::new("de", "German", "Deutsch"),
        LocaleConfig::new("ar", "Arabic", "العربية").rtl(),
        LocaleConfig::new("he", "Hebrew", "עברית").rtl(),
    ]
}
