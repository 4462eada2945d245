use super::{types::Config, ConfigError};
use crate::index::FuzzyOptions;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn validate_fuzzy(section: &str, fuzzy: &FuzzyOptions) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&fuzzy.threshold) {
        return Err(invalid(format!(
            "{}.fuzzy.threshold must be between 0 and 1",
            section
        )));
    }
    let weights = [fuzzy.title_weight, fuzzy.year_weight, fuzzy.genre_weight];
    if weights.iter().any(|w| *w < 0.0) {
        return Err(invalid(format!(
            "{}.fuzzy weights cannot be negative",
            section
        )));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(invalid(format!(
            "{}.fuzzy weights must not all be 0",
            section
        )));
    }
    Ok(())
}

/// Validate configuration
///
/// Rejects zero ports, page sizes, capacities and limits, and fuzzy
/// thresholds outside [0, 1].
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Search
    if config.search.page_size == 0 {
        return Err(invalid("search.page_size cannot be 0"));
    }
    if config.search.min_query_length == 0 {
        return Err(invalid("search.min_query_length cannot be 0"));
    }
    validate_fuzzy("search", &config.search.fuzzy)?;

    // Capacities and quota
    if config.cache.capacity == 0 {
        return Err(invalid("cache.capacity cannot be 0"));
    }
    if config.history.capacity == 0 {
        return Err(invalid("history.capacity cannot be 0"));
    }
    if config.quota.max_calls_per_window == 0 {
        return Err(invalid("quota.max_calls_per_window cannot be 0"));
    }
    if config.quota.window_hours <= 0 {
        return Err(invalid("quota.window_hours must be positive"));
    }

    // Suggestions
    if config.suggestions.max_total == 0 {
        return Err(invalid("suggestions.max_total cannot be 0"));
    }
    validate_fuzzy("suggestions", &config.suggestions.fuzzy)?;

    if let Some(omdb) = &config.omdb {
        if omdb.api_key.is_empty() {
            return Err(invalid("omdb.api_key cannot be empty"));
        }
    }
    if let Some(tmdb) = &config.tmdb {
        if tmdb.api_key.is_empty() {
            return Err(invalid("tmdb.api_key cannot be empty"));
        }
    }

    Ok(())
}
