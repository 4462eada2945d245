//! Mock remote catalog for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::remote::{RemoteCatalog, RemoteCatalogError, RemoteSearchPage, RemoteSearchRequest};

/// Mock implementation of the RemoteCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configured pages per (query, page), or a default page
/// - Track requests for assertions
/// - Simulate failures and per-query latency (cancel-aware)
pub struct MockRemoteCatalog {
    /// Pages keyed by lowercased query and page number.
    pages: Arc<RwLock<HashMap<(String, u32), RemoteSearchPage>>>,
    /// Returned when no page is configured.
    default_page: Arc<RwLock<RemoteSearchPage>>,
    /// Latency per lowercased query.
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<RemoteCatalogError>>>,
    /// If set, every search fails with this error.
    failure: Arc<RwLock<Option<RemoteCatalogError>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RemoteSearchRequest>>>,
}

impl Default for MockRemoteCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteCatalog {
    /// Create a mock that returns empty pages.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            default_page: Arc::new(RwLock::new(RemoteSearchPage::empty())),
            delays: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            failure: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Configure the response for one query and page.
    pub async fn set_page(&self, query: &str, page: u32, response: RemoteSearchPage) {
        self.pages
            .write()
            .await
            .insert((query.to_lowercase(), page), response);
    }

    /// Configure the response for unconfigured queries.
    pub async fn set_default_page(&self, response: RemoteSearchPage) {
        *self.default_page.write().await = response;
    }

    /// Delay responses for `query` by `delay`.
    pub async fn set_delay(&self, query: &str, delay: Duration) {
        self.delays.write().await.insert(query.to_lowercase(), delay);
    }

    /// Fail the next search with `error`.
    pub async fn set_next_error(&self, error: RemoteCatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail every search with `error` until cleared with `None`.
    pub async fn set_failure(&self, error: Option<RemoteCatalogError>) {
        *self.failure.write().await = error;
    }

    /// Requests received so far, including canceled ones.
    pub async fn recorded_requests(&self) -> Vec<RemoteSearchRequest> {
        self.requests.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl RemoteCatalog for MockRemoteCatalog {
    async fn search(
        &self,
        request: &RemoteSearchRequest,
        token: &CancellationToken,
    ) -> Result<RemoteSearchPage, RemoteCatalogError> {
        self.requests.write().await.push(request.clone());

        let key = request.query.to_lowercase();
        let delay = self.delays.read().await.get(&key).copied();
        if let Some(delay) = delay {
            tokio::select! {
                _ = token.cancelled() => return Err(RemoteCatalogError::Canceled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if token.is_cancelled() {
            return Err(RemoteCatalogError::Canceled);
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if let Some(error) = self.failure.read().await.clone() {
            return Err(error);
        }

        let configured = self.pages.read().await.get(&(key, request.page)).cloned();
        match configured {
            Some(page) => Ok(page),
            None => Ok(self.default_page.read().await.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
