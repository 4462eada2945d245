//! Remote catalog integration.
//!
//! The search orchestrator talks to the upstream title-search API through
//! the [`RemoteCatalog`] trait, and the suggestion engine pulls trending
//! keywords through [`TrendingSource`]. Both are narrow seams so the core
//! can be driven by mocks in tests.

mod omdb;
mod tmdb;

pub use omdb::{OmdbClient, OmdbConfig};
pub use tmdb::{TmdbConfig, TmdbTrendingClient};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::catalog::{CatalogItem, TypeFilter};

/// Errors that can occur when talking to a remote catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteCatalogError {
    /// Transport failed before a response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// The transport timed out.
    #[error("Request timed out")]
    Timeout,

    /// The API answered with an error.
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The caller canceled the request.
    #[error("Request canceled")]
    Canceled,

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for RemoteCatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteCatalogError::Timeout
        } else if err.is_decode() {
            RemoteCatalogError::Parse(err.to_string())
        } else {
            RemoteCatalogError::Network(err.to_string())
        }
    }
}

/// A single page request against the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSearchRequest {
    pub query: String,
    #[serde(default)]
    pub filter: TypeFilter,
    /// 1-based page number.
    pub page: u32,
}

impl RemoteSearchRequest {
    pub fn new(query: impl Into<String>, filter: TypeFilter, page: u32) -> Self {
        Self {
            query: query.into(),
            filter,
            page,
        }
    }
}

/// One page of remote results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSearchPage {
    pub items: Vec<CatalogItem>,
    /// Total matches reported by the upstream across all pages.
    pub total_results: u32,
}

impl RemoteSearchPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Title search against a remote catalog.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Fetch one page of results.
    ///
    /// Implementations must return [`RemoteCatalogError::Canceled`] promptly
    /// once `token` is canceled.
    async fn search(
        &self,
        request: &RemoteSearchRequest,
        token: &CancellationToken,
    ) -> Result<RemoteSearchPage, RemoteCatalogError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Source of trending keywords for suggestions.
#[async_trait]
pub trait TrendingSource: Send + Sync {
    async fn fetch_trending(&self) -> Result<Vec<String>, RemoteCatalogError>;
}

/// Remote catalog used when none is configured; every search fails with
/// [`RemoteCatalogError::NotConfigured`], so only local results are served.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRemoteCatalog;

#[async_trait]
impl RemoteCatalog for DisabledRemoteCatalog {
    async fn search(
        &self,
        _request: &RemoteSearchRequest,
        _token: &CancellationToken,
    ) -> Result<RemoteSearchPage, RemoteCatalogError> {
        Err(RemoteCatalogError::NotConfigured(
            "No remote catalog configured".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_to_all_filter() {
        let request: RemoteSearchRequest =
            serde_json::from_str(r#"{"query": "heat", "page": 2}"#).unwrap();
        assert_eq!(request.filter, TypeFilter::All);
        assert_eq!(request.page, 2);
    }

    #[tokio::test]
    async fn test_disabled_catalog_reports_not_configured() {
        let result = DisabledRemoteCatalog
            .search(
                &RemoteSearchRequest::new("heat", TypeFilter::All, 1),
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(RemoteCatalogError::NotConfigured(_))));
    }
}
