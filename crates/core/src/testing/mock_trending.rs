//! Mock trending source for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::remote::{RemoteCatalogError, TrendingSource};

/// Mock implementation of the TrendingSource trait.
pub struct MockTrendingSource {
    keywords: Arc<RwLock<Vec<String>>>,
    error: Arc<RwLock<Option<RemoteCatalogError>>>,
    fetches: Arc<RwLock<usize>>,
}

impl Default for MockTrendingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTrendingSource {
    /// A source that returns no keywords.
    pub fn new() -> Self {
        Self::with_keywords(Vec::new())
    }

    pub fn with_keywords(keywords: Vec<&str>) -> Self {
        Self {
            keywords: Arc::new(RwLock::new(
                keywords.into_iter().map(String::from).collect(),
            )),
            error: Arc::new(RwLock::new(None)),
            fetches: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn set_keywords(&self, keywords: Vec<&str>) {
        *self.keywords.write().await = keywords.into_iter().map(String::from).collect();
    }

    /// Fail fetches with `error` until cleared with `None`.
    pub async fn set_error(&self, error: Option<RemoteCatalogError>) {
        *self.error.write().await = error;
    }

    pub async fn fetch_count(&self) -> usize {
        *self.fetches.read().await
    }
}

#[async_trait]
impl TrendingSource for MockTrendingSource {
    async fn fetch_trending(&self) -> Result<Vec<String>, RemoteCatalogError> {
        *self.fetches.write().await += 1;
        if let Some(error) = self.error.read().await.clone() {
            return Err(error);
        }
        Ok(self.keywords.read().await.clone())
    }
}
