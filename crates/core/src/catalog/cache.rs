//! Bounded, deduplicated cache of previously seen catalog items.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info};

use super::CatalogItem;
use crate::metrics;
use crate::storage::{load_json, save_json, KeyValueStore, RESULT_CACHE_KEY};

/// Default number of items kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 1500;

/// Insertion-ordered item cache with FIFO eviction.
///
/// Order is the order of first observation. An id is stored at most once and
/// the first stored version wins; later fetches of the same id do not update
/// it in place.
pub struct ResultCache {
    items: VecDeque<Arc<CatalogItem>>,
    ids: HashSet<String>,
    capacity: usize,
    store: Arc<dyn KeyValueStore>,
}

impl ResultCache {
    /// Create an empty cache persisting to `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            ids: HashSet::new(),
            capacity: capacity.max(1),
            store,
        }
    }

    /// Load the persisted snapshot.
    ///
    /// A missing or corrupt snapshot yields an empty cache. The loaded items
    /// go through the same dedup and capacity rules as live inserts.
    pub async fn load(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        let mut cache = Self::new(store, capacity);
        if let Some(items) = load_json::<Vec<CatalogItem>>(cache.store.as_ref(), RESULT_CACHE_KEY).await
        {
            cache.insert_new(items);
            info!("Loaded {} cached catalog items", cache.len());
        }
        metrics::CACHE_ITEMS.set(cache.len() as i64);
        cache
    }

    /// Insert items whose id is not cached yet, evict the oldest entries
    /// beyond capacity, and persist.
    ///
    /// Returns the number of newly inserted items; a non-zero count means the
    /// derived index is out of date.
    pub async fn upsert_all<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = CatalogItem>,
    {
        let inserted = self.insert_new(items);
        if inserted > 0 {
            debug!(
                "Cached {} new items ({} total, capacity {})",
                inserted,
                self.items.len(),
                self.capacity
            );
            self.persist().await;
            metrics::CACHE_ITEMS.set(self.items.len() as i64);
        }
        inserted
    }

    fn insert_new<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = CatalogItem>,
    {
        let mut inserted = 0;
        for item in items {
            if self.ids.contains(&item.id) {
                continue;
            }
            self.ids.insert(item.id.clone());
            self.items.push_back(Arc::new(item));
            inserted += 1;
        }

        while self.items.len() > self.capacity {
            if let Some(evicted) = self.items.pop_front() {
                self.ids.remove(&evicted.id);
            }
        }

        inserted
    }

    async fn persist(&self) {
        let snapshot: Vec<&CatalogItem> = self.items.iter().map(|item| item.as_ref()).collect();
        save_json(self.store.as_ref(), RESULT_CACHE_KEY, &snapshot).await;
    }

    /// Items in insertion order (oldest first).
    pub fn snapshot(&self) -> Vec<Arc<CatalogItem>> {
        self.items.iter().cloned().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<CatalogItem>> {
        if !self.ids.contains(id) {
            return None;
        }
        self.items.iter().find(|item| item.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
