//! Local catalog: the result cache plus the fuzzy index derived from it.
//!
//! The cache stores items seen in earlier remote searches so later searches
//! and suggestions can be answered on-device before spending remote quota.

mod cache;
mod types;

pub use cache::{ResultCache, DEFAULT_CACHE_CAPACITY};
pub use types::*;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::index::{FuzzyIndex, FuzzyMatch, FuzzyOptions, IndexState};

/// Shared handle to the local catalog.
pub type SharedCatalog = Arc<Mutex<LocalCatalog>>;

/// Result cache paired with its lazily rebuilt index.
pub struct LocalCatalog {
    cache: ResultCache,
    index: FuzzyIndex,
}

impl LocalCatalog {
    pub fn new(cache: ResultCache) -> Self {
        Self {
            cache,
            index: FuzzyIndex::new(),
        }
    }

    /// Wrap into the shared handle used by the orchestrator and suggestion engine.
    pub fn shared(self) -> SharedCatalog {
        Arc::new(Mutex::new(self))
    }

    /// Search the index, rebuilding it first if the cache changed.
    pub fn search(&mut self, query: &str, limit: Option<usize>, options: &FuzzyOptions) -> Vec<FuzzyMatch> {
        if self.index.needs_rebuild() {
            self.index.build(&self.cache.snapshot());
            debug!("Rebuilt fuzzy index over {} items", self.index.len());
        }
        self.index.search(query, limit, options)
    }

    /// Add newly seen items to the cache; marks the index stale when
    /// anything was inserted. Returns the inserted count.
    pub async fn upsert_all<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = CatalogItem>,
    {
        let inserted = self.cache.upsert_all(items).await;
        if inserted > 0 {
            self.index.mark_stale();
        }
        inserted
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn index_state(&self) -> IndexState {
        self.index.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::fixtures;

    fn empty_catalog() -> LocalCatalog {
        LocalCatalog::new(ResultCache::new(Arc::new(MemoryStore::new()), 100))
    }

    #[tokio::test]
    async fn test_search_builds_lazily() {
        let mut catalog = empty_catalog();
        assert_eq!(catalog.index_state(), IndexState::Absent);

        assert!(catalog
            .search("alien", None, &FuzzyOptions::default())
            .is_empty());
        assert_eq!(catalog.index_state(), IndexState::Current);
    }

    #[tokio::test]
    async fn test_upsert_marks_stale_and_next_search_sees_items() {
        let mut catalog = empty_catalog();
        catalog.search("alien", None, &FuzzyOptions::default());

        catalog
            .upsert_all(vec![fixtures::movie("tt0078748", "Alien", "1979")])
            .await;
        assert_eq!(catalog.index_state(), IndexState::Stale);

        let matches = catalog.search("alien", None, &FuzzyOptions::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(catalog.index_state(), IndexState::Current);
    }

    #[tokio::test]
    async fn test_burst_of_writes_stays_stale_until_read() {
        let mut catalog = empty_catalog();
        catalog.search("x", None, &FuzzyOptions::default());

        for i in 0..3 {
            catalog
                .upsert_all(vec![fixtures::movie(&format!("tt{}", i), "Alien", "1979")])
                .await;
            assert_eq!(catalog.index_state(), IndexState::Stale);
        }

        assert_eq!(catalog.search("alien", None, &FuzzyOptions::default()).len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_upsert_keeps_index_current() {
        let mut catalog = empty_catalog();
        catalog
            .upsert_all(vec![fixtures::movie("tt1", "Alien", "1979")])
            .await;
        catalog.search("alien", None, &FuzzyOptions::default());

        catalog
            .upsert_all(vec![fixtures::movie("tt1", "Alien", "1979")])
            .await;
        assert_eq!(catalog.index_state(), IndexState::Current);
    }
}
