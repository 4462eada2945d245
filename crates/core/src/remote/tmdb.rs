//! TMDB (The Movie Database) trending client.
//!
//! Only the weekly trending endpoint is used; its movie and TV titles seed
//! the suggestion engine's trending keywords.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RemoteCatalogError, TrendingSource};

fn default_max_keywords() -> usize {
    10
}

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Keywords kept from one trending response.
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

/// TMDB trending client.
pub struct TmdbTrendingClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_keywords: usize,
}

impl TmdbTrendingClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, RemoteCatalogError> {
        if config.api_key.is_empty() {
            return Err(RemoteCatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            max_keywords: config.max_keywords,
        })
    }
}

#[async_trait]
impl TrendingSource for TmdbTrendingClient {
    async fn fetch_trending(&self) -> Result<Vec<String>, RemoteCatalogError> {
        let url = format!("{}/trending/all/week", self.base_url);

        debug!("TMDB trending fetch");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(RemoteCatalogError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteCatalogError::Api(format!("{} - {}", status.as_u16(), body)));
        }

        let trending: TmdbTrendingResponse = response.json().await.map_err(|e| {
            RemoteCatalogError::Parse(format!("Failed to parse trending response: {}", e))
        })?;

        Ok(trending.keywords(self.max_keywords))
    }
}

// TMDB API response types

#[derive(Debug, Deserialize)]
struct TmdbTrendingResponse {
    #[serde(default)]
    results: Vec<TmdbTrendingResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbTrendingResult {
    /// Movies carry `title`.
    title: Option<String>,
    /// TV shows and people carry `name`.
    name: Option<String>,
    media_type: Option<String>,
}

impl TmdbTrendingResponse {
    /// Distinct movie/TV titles in upstream order.
    fn keywords(self, max: usize) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for result in self.results {
            if result.media_type.as_deref() == Some("person") {
                continue;
            }
            let Some(title) = result.title.or(result.name) else {
                continue;
            };
            let title = title.trim().to_string();
            if title.is_empty() || keywords.iter().any(|k| k.eq_ignore_ascii_case(&title)) {
                continue;
            }
            keywords.push(title);
            if keywords.len() >= max {
                break;
            }
        }
        keywords
    }
}
