use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::catalog::DEFAULT_CACHE_CAPACITY;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::remote::{OmdbConfig, TmdbConfig};
use crate::searcher::{QuotaConfig, SearchConfig};
use crate::suggestions::SuggestionConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    /// Remote title search. Without it every remote lookup fails as unconfigured.
    #[serde(default)]
    pub omdb: Option<OmdbConfig>,
    /// Trending keywords source. Without it the fallback list is used.
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Key-value storage backend
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// Nothing survives a restart.
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// SQLite database file (sqlite backend only)
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("cinefind.db")
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Search history configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub quota: QuotaConfig,
    pub history: HistoryConfig,
    pub suggestions: SuggestionConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omdb: Option<SanitizedOmdbConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<SanitizedTmdbConfig>,
}

/// Sanitized OMDb config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub api_key_configured: bool,
    pub max_keywords: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            storage: config.storage.clone(),
            search: config.search.clone(),
            cache: config.cache.clone(),
            quota: config.quota.clone(),
            history: config.history.clone(),
            suggestions: config.suggestions.clone(),
            omdb: config.omdb.as_ref().map(|o| SanitizedOmdbConfig {
                base_url: o.base_url.clone(),
                api_key_configured: !o.api_key.is_empty(),
                timeout_secs: o.timeout_secs,
            }),
            tmdb: config.tmdb.as_ref().map(|t| SanitizedTmdbConfig {
                base_url: t.base_url.clone(),
                api_key_configured: !t.api_key.is_empty(),
                max_keywords: t.max_keywords,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path.to_str().unwrap(), "cinefind.db");
        assert_eq!(config.cache.capacity, 1500);
        assert_eq!(config.history.capacity, 20);
        assert_eq!(config.quota.max_calls_per_window, 1000);
        assert_eq!(config.search.sufficiency_threshold, 20);
        assert_eq!(config.suggestions.debounce_ms, 200);
        assert!(config.omdb.is_none());
        assert!(config.tmdb.is_none());
    }

    #[test]
    fn test_deserialize_nested_sections() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[storage]
backend = "memory"

[search]
page_size = 5

[search.fuzzy]
threshold = 0.3

[suggestions.fuzzy]
threshold = 0.6

[omdb]
api_key = "omdb-key"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.search.page_size, 5);
        assert_eq!(config.search.fuzzy.threshold, 0.3);
        assert_eq!(config.search.fuzzy.title_weight, 0.7);
        assert_eq!(config.suggestions.fuzzy.threshold, 0.6);

        let omdb = config.omdb.as_ref().unwrap();
        assert_eq!(omdb.api_key, "omdb-key");
        assert_eq!(omdb.timeout_secs, 10); // default
    }

    #[test]
    fn test_sanitized_config_hides_keys() {
        let toml = r#"
[omdb]
api_key = "secret-omdb"

[tmdb]
api_key = "secret-tmdb"
base_url = "http://localhost:9999"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        let omdb = sanitized.omdb.as_ref().unwrap();
        assert!(omdb.api_key_configured);
        let tmdb = sanitized.tmdb.as_ref().unwrap();
        assert_eq!(tmdb.base_url.as_deref(), Some("http://localhost:9999"));

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-omdb"));
        assert!(!json.contains("secret-tmdb"));
    }

    #[test]
    fn test_sanitized_config_without_remotes() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(sanitized.omdb.is_none());
        assert!(sanitized.tmdb.is_none());
        assert_eq!(sanitized.server.port, 8080);
    }
}
