use crate::health::{DefaultHeuristic, EngineSettings, SeverityWeights, DEFAULT_MIN_LENGTH};
use crate::i18n::LocaleRegistry;
use anyhow::{bail, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Feature gate
    pub engine_enabled: bool,

    // Scoring
    pub known_locales: Vec<String>,
    pub fallback_locale: String,
    pub severity_weights: SeverityWeights,

    // Detection
    pub hardcoded_min_length: usize,
    pub registry: LocaleRegistry,

    // HTTP
    pub port: u16,
    pub admin_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&LocaleRegistry::default(), |name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source, with defaults
    /// taken from `registry`.
    pub fn from_lookup<F>(registry: &LocaleRegistry, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SeverityWeights::default();

        Ok(Self {
            // Feature gate
            engine_enabled: match lookup("HEALTH_ENGINE_ENABLED") {
                Some(value) => parse_bool("HEALTH_ENGINE_ENABLED", &value)?,
                None => true,
            },

            // Scoring
            known_locales: lookup("KNOWN_LOCALES")
                .map(|value| parse_list(&value))
                .unwrap_or_else(|| registry.enabled_codes()),
            fallback_locale: lookup("FALLBACK_LOCALE")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or_else(|| registry.canonical().map(|locale| locale.code.to_string()))
                .unwrap_or_else(|| "en".to_string()),
            severity_weights: SeverityWeights {
                high: parse_or(&lookup, "SEVERITY_WEIGHT_HIGH", defaults.high),
                medium: parse_or(&lookup, "SEVERITY_WEIGHT_MEDIUM", defaults.medium),
                low: parse_or(&lookup, "SEVERITY_WEIGHT_LOW", defaults.low),
            },

            // Detection
            hardcoded_min_length: parse_or(&lookup, "HARDCODED_MIN_LENGTH", DEFAULT_MIN_LENGTH),
            registry: registry.clone(),

            // HTTP
            port: parse_or(&lookup, "PORT", 8080),
            admin_api_key: lookup("ADMIN_API_KEY").filter(|key| !key.is_empty()),
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            feature_enabled: self.engine_enabled,
            known_locales: self.known_locales.clone(),
            fallback_locale: self.fallback_locale.clone(),
            weights: self.severity_weights,
            registry: self.registry.clone(),
            ..EngineSettings::default()
        }
    }

    pub fn heuristic(&self) -> DefaultHeuristic {
        DefaultHeuristic::new(self.hardcoded_min_length)
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} must be true or false, got '{}'", name, other),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
