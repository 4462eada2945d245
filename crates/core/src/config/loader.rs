use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::warn;

use super::{types::Config, ConfigError};

/// Environment variable prefix; `__` separates nested keys
/// (`CINEFIND_SEARCH__PAGE_SIZE=5`).
const ENV_PREFIX: &str = "CINEFIND_";

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path)))
}

/// Like [`load_config`], but a missing file yields the defaults (plus
/// environment overrides) instead of an error.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        warn!(
            "Configuration file {:?} not found, using defaults",
            path
        );
        return extract(Figment::from(Serialized::defaults(Config::default())));
    }
    load_config(path)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
