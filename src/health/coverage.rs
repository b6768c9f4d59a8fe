//! Per-locale key exposure.
//!
//! Counts distinct translation keys looked up under each locale since the
//! process started. The counts only ever grow: clearing or resolving issues
//! does not reduce how much of a locale has been exercised.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct KeyCoverage {
    observed: HashMap<String, HashSet<String>>,
}

impl KeyCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `full_key` was looked up under `locale`.
    ///
    /// Returns `true` the first time the pair is seen. Blank locales or keys
    /// are ignored.
    pub fn observe(&mut self, locale: &str, full_key: &str) -> bool {
        let locale = locale.trim();
        let full_key = full_key.trim();
        if locale.is_empty() || full_key.is_empty() {
            return false;
        }

        self.observed
            .entry(locale.to_string())
            .or_default()
            .insert(full_key.to_string())
    }

    /// Distinct keys observed under `locale`.
    pub fn total_for(&self, locale: &str) -> usize {
        self.observed.get(locale).map_or(0, HashSet::len)
    }

    /// Totals for every locale that has at least one observation.
    pub fn totals(&self) -> HashMap<String, usize> {
        self.observed
            .iter()
            .map(|(locale, keys)| (locale.clone(), keys.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_counts_distinct_keys() {
        let mut coverage = KeyCoverage::new();

        assert!(coverage.observe("en", "common.save"));
        assert!(!coverage.observe("en", "common.save"));
        assert!(coverage.observe("en", "common.cancel"));

        assert_eq!(coverage.total_for("en"), 2);
    }

    #[test]
    fn test_locales_are_independent() {
        let mut coverage = KeyCoverage::new();
        coverage.observe("en", "common.save");
        coverage.observe("es", "common.save");

        assert_eq!(coverage.total_for("en"), 1);
        assert_eq!(coverage.total_for("es"), 1);
        assert_eq!(coverage.total_for("fr"), 0);
    }

    #[test]
    fn test_blank_input_ignored() {
        let mut coverage = KeyCoverage::new();
        assert!(!coverage.observe("", "common.save"));
        assert!(!coverage.observe("en", "  "));
        assert!(coverage.totals().is_empty());
    }

    #[test]
    fn test_totals() {
        let mut coverage = KeyCoverage::new();
        coverage.observe("en", "a");
        coverage.observe("en", "b");
        coverage.observe("ar", "a");

        let totals = coverage.totals();
        assert_eq!(totals.get("en"), Some(&2));
        assert_eq!(totals.get("ar"), Some(&1));
    }
}
