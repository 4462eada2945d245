//! OMDb title search client.
//!
//! OMDb pages are fixed at ten results. A search with no hits comes back as
//! `{"Response":"False","Error":"Movie not found!"}`, which is an empty page
//! rather than a failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{RemoteCatalog, RemoteCatalogError, RemoteSearchPage, RemoteSearchRequest};
use crate::catalog::CatalogItem;

const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";
const NOT_FOUND_MESSAGE: &str = "movie not found!";

fn default_timeout_secs() -> u64 {
    10
}

/// OMDb client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    /// OMDb API key (required).
    pub api_key: String,
    /// Base URL (default: https://www.omdbapi.com/).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Transport timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// OMDb API client.
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Create a new OMDb client.
    pub fn new(config: OmdbConfig) -> Result<Self, RemoteCatalogError> {
        if config.api_key.is_empty() {
            return Err(RemoteCatalogError::NotConfigured(
                "OMDb API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    async fn fetch(
        &self,
        request: &RemoteSearchRequest,
    ) -> Result<RemoteSearchPage, RemoteCatalogError> {
        debug!(
            "OMDb search: query='{}', filter={:?}, page={}",
            request.query, request.filter, request.page
        );

        let page = request.page.max(1).to_string();
        let mut http = self.client.get(&self.base_url).query(&[
            ("apikey", self.api_key.as_str()),
            ("s", request.query.as_str()),
            ("page", page.as_str()),
        ]);
        if let Some(item_type) = request.filter.as_query_param() {
            http = http.query(&[("type", item_type)]);
        }

        let response = http.send().await?;

        let status = response.status();
        if status == 401 {
            return Err(RemoteCatalogError::NotConfigured(
                "Invalid OMDb API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteCatalogError::Api(format!("{} - {}", status.as_u16(), body)));
        }

        let body: OmdbSearchResponse = response.json().await.map_err(|e| {
            RemoteCatalogError::Parse(format!("Failed to parse search response: {}", e))
        })?;

        body.into_page()
    }
}

#[async_trait]
impl RemoteCatalog for OmdbClient {
    async fn search(
        &self,
        request: &RemoteSearchRequest,
        token: &CancellationToken,
    ) -> Result<RemoteSearchPage, RemoteCatalogError> {
        if token.is_cancelled() {
            return Err(RemoteCatalogError::Canceled);
        }
        tokio::select! {
            _ = token.cancelled() => Err(RemoteCatalogError::Canceled),
            result = self.fetch(request) => result,
        }
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

// OMDb API response types

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<CatalogItem>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

impl OmdbSearchResponse {
    fn into_page(self) -> Result<RemoteSearchPage, RemoteCatalogError> {
        if !self.response.eq_ignore_ascii_case("true") {
            let message = self.error.unwrap_or_else(|| "Unknown error".to_string());
            if message.trim().eq_ignore_ascii_case(NOT_FOUND_MESSAGE) {
                return Ok(RemoteSearchPage::empty());
            }
            return Err(RemoteCatalogError::Api(message));
        }

        let reported = self
            .total_results
            .as_deref()
            .and_then(|t| t.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Ok(RemoteSearchPage {
            total_results: reported.max(self.search.len() as u32),
            items: self.search,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemType;

    fn parse(json: &str) -> Result<RemoteSearchPage, RemoteCatalogError> {
        serde_json::from_str::<OmdbSearchResponse>(json)
            .unwrap()
            .into_page()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = OmdbClient::new(OmdbConfig {
            api_key: String::new(),
            base_url: None,
            timeout_secs: 10,
        });
        assert!(matches!(result, Err(RemoteCatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_parse_search_page() {
        let page = parse(
            r#"{
                "Search": [
                    {"Title": "Inception", "Year": "2010", "imdbID": "tt1375666", "Type": "movie", "Poster": "https://example.com/p.jpg"},
                    {"Title": "Inception: The Cobol Job", "Year": "2010", "imdbID": "tt5295894", "Type": "movie", "Poster": "N/A"}
                ],
                "totalResults": "34",
                "Response": "True"
            }"#,
        )
        .unwrap();

        assert_eq!(page.total_results, 34);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "tt1375666");
        assert_eq!(page.items[0].item_type, ItemType::Movie);
        assert!(page.items[1].has_missing_poster());
    }

    #[test]
    fn test_not_found_is_empty_page() {
        let page = parse(r#"{"Response": "False", "Error": "Movie not found!"}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_results, 0);
    }

    #[test]
    fn test_other_false_response_is_api_error() {
        let err = parse(r#"{"Response": "False", "Error": "Too many results."}"#).unwrap_err();
        assert_eq!(err, RemoteCatalogError::Api("Too many results.".to_string()));
    }

    #[test]
    fn test_unparseable_total_falls_back_to_item_count() {
        let page = parse(
            r#"{
                "Search": [{"Title": "Up", "Year": "2009", "imdbID": "tt1049413", "Type": "movie", "Poster": "N/A"}],
                "totalResults": "lots",
                "Response": "True"
            }"#,
        )
        .unwrap();
        assert_eq!(page.total_results, 1);
    }

    #[tokio::test]
    async fn test_search_with_canceled_token() {
        let client = OmdbClient::new(OmdbConfig {
            api_key: "key".to_string(),
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 1,
        })
        .unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = client
            .search(&RemoteSearchRequest::new("alien", Default::default(), 1), &token)
            .await;
        assert_eq!(result.unwrap_err(), RemoteCatalogError::Canceled);
    }
}
