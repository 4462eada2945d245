//! Search history.
//!
//! Most-recent-first list of submitted queries, bounded and deduplicated.
//! Every mutation publishes the new list to subscribers and persists it.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::storage::{load_json, save_json, KeyValueStore, SEARCH_HISTORY_KEY};

/// Default number of remembered queries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Persistent search history.
pub struct HistoryStore {
    entries: watch::Sender<Vec<String>>,
    capacity: usize,
    min_query_length: usize,
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    /// Load stored history, trimming it to `capacity`.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        capacity: usize,
        min_query_length: usize,
    ) -> Self {
        let mut entries: Vec<String> = load_json(store.as_ref(), SEARCH_HISTORY_KEY)
            .await
            .unwrap_or_default();
        let mut seen = std::collections::HashSet::new();
        entries.retain(|e| seen.insert(e.clone()));
        entries.truncate(capacity);
        if !entries.is_empty() {
            info!("Loaded {} search history entries", entries.len());
        }

        let (entries, _) = watch::channel(entries);
        Self {
            entries,
            capacity,
            min_query_length,
            store,
        }
    }

    /// Record a submitted query at the front.
    ///
    /// Returns false (and persists nothing) for too-short input or when the
    /// term is already the most recent entry.
    pub async fn record(&self, term: &str) -> bool {
        let term = term.trim();
        if term.chars().count() < self.min_query_length.max(1) {
            return false;
        }

        let capacity = self.capacity;
        let changed = self.entries.send_if_modified(|entries| {
            if entries.first().map(String::as_str) == Some(term) {
                return false;
            }
            entries.retain(|e| e != term);
            entries.insert(0, term.to_string());
            entries.truncate(capacity);
            true
        });

        if changed {
            debug!("Recorded search history entry '{}'", term);
            self.persist().await;
        }
        changed
    }

    /// Remove one entry. Returns whether it was present.
    pub async fn delete(&self, term: &str) -> bool {
        let removed = self.entries.send_if_modified(|entries| {
            let before = entries.len();
            entries.retain(|e| e != term);
            entries.len() != before
        });
        if removed {
            self.persist().await;
        }
        removed
    }

    /// Remove every entry.
    pub async fn clear_all(&self) {
        self.entries.send_modify(|entries| entries.clear());
        self.persist().await;
    }

    /// Current entries, most recent first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.entries.subscribe()
    }

    async fn persist(&self) {
        let snapshot = self.entries();
        save_json(self.store.as_ref(), SEARCH_HISTORY_KEY, &snapshot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::MockKeyValueStore;

    async fn history() -> HistoryStore {
        HistoryStore::load(Arc::new(MemoryStore::new()), DEFAULT_HISTORY_CAPACITY, 1).await
    }

    #[tokio::test]
    async fn test_duplicate_submission_kept_once() {
        let history = history().await;
        assert!(history.record("batman").await);
        assert!(!history.record("batman").await);
        assert_eq!(history.entries(), vec!["batman"]);
    }

    #[tokio::test]
    async fn test_resubmission_moves_to_front() {
        let history = history().await;
        history.record("batman").await;
        history.record("robin").await;
        history.record("batman").await;
        assert_eq!(history.entries(), vec!["batman", "robin"]);
    }

    #[tokio::test]
    async fn test_ignores_blank_input() {
        let history = history().await;
        assert!(!history.record("   ").await);
        assert!(history.entries().is_empty());
    }

    #[tokio::test]
    async fn test_min_length() {
        let history = HistoryStore::load(Arc::new(MemoryStore::new()), 20, 3).await;
        assert!(!history.record("ab").await);
        assert!(history.record("abc").await);
        assert_eq!(history.entries(), vec!["abc"]);
    }

    #[tokio::test]
    async fn test_capacity_drops_oldest() {
        let history = HistoryStore::load(Arc::new(MemoryStore::new()), 3, 1).await;
        for term in ["a", "b", "c", "d"] {
            history.record(term).await;
        }
        assert_eq!(history.entries(), vec!["d", "c", "b"]);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let history = history().await;
        history.record("alien").await;
        history.record("aliens").await;

        assert!(history.delete("alien").await);
        assert!(!history.delete("alien").await);
        assert_eq!(history.entries(), vec!["aliens"]);

        history.clear_all().await;
        assert!(history.entries().is_empty());
    }

    #[tokio::test]
    async fn test_persists_and_reloads() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let history = HistoryStore::load(Arc::clone(&store), 20, 1).await;
        history.record("heat").await;
        history.record("ronin").await;
        history.delete("heat").await;

        let reloaded = HistoryStore::load(store, 20, 1).await;
        assert_eq!(reloaded.entries(), vec!["ronin"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let history = history().await;
        let mut rx = history.subscribe();

        history.record("up").await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), vec!["up"]);

        history.record("up").await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let store = Arc::new(MockKeyValueStore::new());
        store.set_fail_writes(true);
        let history = HistoryStore::load(store.clone(), 20, 1).await;

        assert!(history.record("heat").await);
        assert_eq!(history.entries(), vec!["heat"]);
        assert_eq!(store.write_count(), 0);
    }
}
