//! Search and quota configuration.

use serde::{Deserialize, Serialize};

use super::rate_limiter::{DEFAULT_MAX_CALLS_PER_WINDOW, DEFAULT_WINDOW_HOURS};
use crate::index::FuzzyOptions;

/// Configuration for the search orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results per page, local and remote.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Local match count at which a page-1 search skips the remote call.
    #[serde(default = "default_sufficiency_threshold")]
    pub sufficiency_threshold: usize,

    /// Shortest accepted query, in characters after trimming.
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// Poster URL substituted when the upstream has none.
    #[serde(default = "default_placeholder_poster_url")]
    pub placeholder_poster_url: String,

    /// Fuzzy matching used for local lookups.
    #[serde(default)]
    pub fuzzy: FuzzyOptions,
}

fn default_page_size() -> usize {
    10
}

fn default_sufficiency_threshold() -> usize {
    20
}

pub(crate) fn default_min_query_length() -> usize {
    1
}

fn default_placeholder_poster_url() -> String {
    "/assets/poster-placeholder.png".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            sufficiency_threshold: default_sufficiency_threshold(),
            min_query_length: default_min_query_length(),
            placeholder_poster_url: default_placeholder_poster_url(),
            fuzzy: FuzzyOptions::default(),
        }
    }
}

/// Remote call quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Calls allowed per window.
    #[serde(default = "default_max_calls")]
    pub max_calls_per_window: u32,

    /// Window length in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
}

fn default_max_calls() -> u32 {
    DEFAULT_MAX_CALLS_PER_WINDOW
}

fn default_window_hours() -> i64 {
    DEFAULT_WINDOW_HOURS
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_calls_per_window: default_max_calls(),
            window_hours: default_window_hours(),
        }
    }
}

impl QuotaConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.window_hours)
    }
}
