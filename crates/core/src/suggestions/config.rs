//! Suggestion engine configuration.

use serde::{Deserialize, Serialize};

use crate::index::FuzzyOptions;

/// Configuration for the suggestion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Trailing debounce window for keystrokes (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Upper bound on suggestions returned.
    #[serde(default = "default_max_total")]
    pub max_total: usize,

    /// History entries starting with the input.
    #[serde(default = "default_history_prefix_limit")]
    pub history_prefix_limit: usize,

    /// History entries containing the input elsewhere.
    #[serde(default = "default_history_contains_limit")]
    pub history_contains_limit: usize,

    /// Fuzzy title matches from the local index.
    #[serde(default = "default_fuzzy_limit")]
    pub fuzzy_limit: usize,

    /// Trending keywords containing the input.
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,

    /// History entries shown for empty input.
    #[serde(default = "default_empty_input_limit")]
    pub empty_history_limit: usize,

    /// Trending keywords shown for empty input.
    #[serde(default = "default_empty_input_limit")]
    pub empty_trending_limit: usize,

    /// How long fetched trending keywords stay fresh (hours).
    #[serde(default = "default_trending_freshness_hours")]
    pub trending_freshness_hours: i64,

    /// Fuzzy matching for title suggestions.
    #[serde(default = "FuzzyOptions::suggestions")]
    pub fuzzy: FuzzyOptions,
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_max_total() -> usize {
    8
}

fn default_history_prefix_limit() -> usize {
    3
}

fn default_history_contains_limit() -> usize {
    2
}

fn default_fuzzy_limit() -> usize {
    4
}

fn default_trending_limit() -> usize {
    3
}

fn default_empty_input_limit() -> usize {
    5
}

fn default_trending_freshness_hours() -> i64 {
    6
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_total: default_max_total(),
            history_prefix_limit: default_history_prefix_limit(),
            history_contains_limit: default_history_contains_limit(),
            fuzzy_limit: default_fuzzy_limit(),
            trending_limit: default_trending_limit(),
            empty_history_limit: default_empty_input_limit(),
            empty_trending_limit: default_empty_input_limit(),
            trending_freshness_hours: default_trending_freshness_hours(),
            fuzzy: FuzzyOptions::suggestions(),
        }
    }
}

impl SuggestionConfig {
    pub fn trending_freshness(&self) -> chrono::Duration {
        chrono::Duration::hours(self.trending_freshness_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_matches_default() {
        let parsed: SuggestionConfig = toml::from_str("").unwrap();
        let default = SuggestionConfig::default();
        assert_eq!(parsed.debounce_ms, default.debounce_ms);
        assert_eq!(parsed.max_total, 8);
        assert_eq!(parsed.fuzzy, FuzzyOptions::suggestions());
    }
}
