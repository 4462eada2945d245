//! Trending keywords for suggestions.
//!
//! Fetched once at startup and cached in the key-value store with the time
//! of the fetch. A cached list younger than the freshness window is reused;
//! otherwise the source is asked again. When the source fails or returns
//! nothing, a fixed fallback list is served.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::remote::TrendingSource;
use crate::storage::{load_json, save_json, KeyValueStore, TRENDING_KEYWORDS_KEY};

/// Served when no fresh trending list is available.
pub const FALLBACK_TRENDING_KEYWORDS: &[&str] = &[
    "Dune",
    "Oppenheimer",
    "The Batman",
    "Spider-Man",
    "Barbie",
    "The Last of Us",
    "Stranger Things",
    "Breaking Bad",
    "Interstellar",
    "The Office",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedTrending {
    keywords: Vec<String>,
    fetched_at: DateTime<Utc>,
}

/// Where the current keywords came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingOrigin {
    Fallback,
    Cache,
    Source,
}

/// Current trending keywords plus the machinery to refresh them.
pub struct TrendingKeywords {
    keywords: RwLock<Vec<String>>,
    source: Option<Arc<dyn TrendingSource>>,
    store: Arc<dyn KeyValueStore>,
    freshness: Duration,
}

impl TrendingKeywords {
    /// Start with the fallback list; call [`refresh`](Self::refresh) to load.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        source: Option<Arc<dyn TrendingSource>>,
        freshness: Duration,
    ) -> Self {
        Self {
            keywords: RwLock::new(Self::fallback()),
            source,
            store,
            freshness,
        }
    }

    pub fn fallback() -> Vec<String> {
        FALLBACK_TRENDING_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect()
    }

    /// Current keywords.
    pub fn keywords(&self) -> Vec<String> {
        self.keywords
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, keywords: Vec<String>) {
        *self
            .keywords
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = keywords;
    }

    /// Load fresh cached keywords or fetch new ones. Never fails.
    pub async fn refresh(&self, now: DateTime<Utc>) -> TrendingOrigin {
        if let Some(cached) =
            load_json::<CachedTrending>(self.store.as_ref(), TRENDING_KEYWORDS_KEY).await
        {
            if !cached.keywords.is_empty() && now - cached.fetched_at < self.freshness {
                debug!(
                    "Using {} cached trending keywords from {}",
                    cached.keywords.len(),
                    cached.fetched_at
                );
                self.replace(cached.keywords);
                return TrendingOrigin::Cache;
            }
        }

        let Some(source) = &self.source else {
            debug!("No trending source configured, using fallback keywords");
            self.replace(Self::fallback());
            return TrendingOrigin::Fallback;
        };

        match source.fetch_trending().await {
            Ok(keywords) if !keywords.is_empty() => {
                info!("Fetched {} trending keywords", keywords.len());
                let cached = CachedTrending {
                    keywords: keywords.clone(),
                    fetched_at: now,
                };
                save_json(self.store.as_ref(), TRENDING_KEYWORDS_KEY, &cached).await;
                self.replace(keywords);
                TrendingOrigin::Source
            }
            Ok(_) => {
                warn!("Trending source returned no keywords, using fallback");
                self.replace(Self::fallback());
                TrendingOrigin::Fallback
            }
            Err(e) => {
                warn!("Failed to fetch trending keywords, using fallback: {}", e);
                self.replace(Self::fallback());
                TrendingOrigin::Fallback
            }
        }
    }
}
