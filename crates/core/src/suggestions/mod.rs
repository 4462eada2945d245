//! Debounced autosuggestions.
//!
//! Suggestions blend recent history, fuzzy title matches from the shared
//! local index and trending keywords. Keystrokes go through
//! [`SuggestionEngine::on_input`], which restarts a trailing debounce timer;
//! only the last input of a burst is computed.

mod config;
mod trending;

pub use config::SuggestionConfig;
pub use trending::{TrendingKeywords, TrendingOrigin, FALLBACK_TRENDING_KEYWORDS};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::catalog::SharedCatalog;
use crate::history::HistoryStore;
use crate::metrics;

/// Observable suggestion state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionState {
    pub input: String,
    pub suggestions: Vec<String>,
    pub trending_keywords: Vec<String>,
}

/// Ordered, deduplicated picks with a global cap.
struct Picks {
    items: Vec<String>,
    max_total: usize,
}

impl Picks {
    fn new(max_total: usize) -> Self {
        Self {
            items: Vec::new(),
            max_total,
        }
    }

    /// Take up to `cap` candidates not already picked.
    fn take<I>(&mut self, candidates: I, cap: usize)
    where
        I: IntoIterator<Item = String>,
    {
        let mut taken = 0;
        for candidate in candidates {
            if taken >= cap || self.items.len() >= self.max_total {
                break;
            }
            if self.items.contains(&candidate) {
                continue;
            }
            self.items.push(candidate);
            taken += 1;
        }
    }
}

struct EngineInner {
    config: SuggestionConfig,
    catalog: SharedCatalog,
    history: Arc<HistoryStore>,
    trending: Arc<TrendingKeywords>,
    state: watch::Sender<SuggestionState>,
    generation: AtomicU64,
}

impl EngineInner {
    async fn compute(&self, input: &str) -> Vec<String> {
        let config = &self.config;
        let input = input.trim();
        let history = self.history.entries();
        let trending = self.trending.keywords();
        let mut picks = Picks::new(config.max_total);

        if input.is_empty() {
            picks.take(history, config.empty_history_limit);
            picks.take(trending, config.empty_trending_limit);
        } else {
            let needle = input.to_lowercase();

            picks.take(
                history
                    .iter()
                    .filter(|h| h.to_lowercase().starts_with(&needle))
                    .cloned(),
                config.history_prefix_limit,
            );
            picks.take(
                history
                    .iter()
                    .filter(|h| {
                        let lower = h.to_lowercase();
                        !lower.starts_with(&needle) && lower.contains(&needle)
                    })
                    .cloned(),
                config.history_contains_limit,
            );

            let titles: Vec<String> = self
                .catalog
                .lock()
                .await
                .search(input, None, &config.fuzzy)
                .into_iter()
                .map(|m| m.item.title.clone())
                .collect();
            picks.take(titles, config.fuzzy_limit);

            picks.take(
                trending
                    .into_iter()
                    .filter(|t| t.to_lowercase().contains(&needle)),
                config.trending_limit,
            );
        }

        metrics::SUGGESTIONS_GENERATED.inc();
        picks.items
    }
}

/// Debounced suggestion engine.
pub struct SuggestionEngine {
    inner: Arc<EngineInner>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SuggestionEngine {
    pub fn new(
        config: SuggestionConfig,
        catalog: SharedCatalog,
        history: Arc<HistoryStore>,
        trending: Arc<TrendingKeywords>,
    ) -> Self {
        let (state, _) = watch::channel(SuggestionState {
            trending_keywords: trending.keywords(),
            ..Default::default()
        });
        Self {
            inner: Arc::new(EngineInner {
                config,
                catalog,
                history,
                trending,
                state,
                generation: AtomicU64::new(0),
            }),
            pending: Mutex::new(None),
        }
    }

    /// Compute suggestions for `input` immediately, bypassing the debounce.
    pub async fn generate(&self, input: &str) -> Vec<String> {
        self.inner.compute(input).await
    }

    /// Register a keystroke.
    ///
    /// Restarts the debounce timer; when it fires without newer input, the
    /// suggestions for `text` are computed and published. Must be called
    /// from within a Tokio runtime.
    pub fn on_input(&self, text: &str) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let input = text.to_string();
        self.inner
            .state
            .send_modify(|state| state.input = input.clone());

        let inner = Arc::clone(&self.inner);
        let delay = Duration::from_millis(self.inner.config.debounce_ms);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            let suggestions = inner.compute(&input).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            debug!("{} suggestions for '{}'", suggestions.len(), input);
            inner
                .state
                .send_modify(|state| state.suggestions = suggestions);
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    /// Record an accepted suggestion into history.
    pub async fn accept(&self, suggestion: &str) -> bool {
        self.inner.history.record(suggestion).await
    }

    /// Reload trending keywords and publish them.
    pub async fn refresh_trending(&self) -> TrendingOrigin {
        let origin = self.inner.trending.refresh(Utc::now()).await;
        let keywords = self.inner.trending.keywords();
        self.inner
            .state
            .send_modify(|state| state.trending_keywords = keywords);
        origin
    }

    pub fn state(&self) -> SuggestionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.inner.state.subscribe()
    }
}

impl Drop for SuggestionEngine {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogItem, LocalCatalog, ResultCache};
    use crate::remote::TrendingSource;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::testing::{fixtures, MockTrendingSource};

    struct Harness {
        engine: SuggestionEngine,
        history: Arc<HistoryStore>,
    }

    async fn harness(cached: Vec<CatalogItem>, trending: Vec<&str>) -> Harness {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut cache = ResultCache::new(Arc::clone(&store), 100);
        cache.upsert_all(cached).await;

        let history = Arc::new(HistoryStore::load(Arc::clone(&store), 20, 1).await);
        let source = Arc::new(MockTrendingSource::with_keywords(trending));
        let trending = Arc::new(TrendingKeywords::new(
            store,
            Some(source as Arc<dyn TrendingSource>),
            chrono::Duration::hours(6),
        ));
        trending.refresh(Utc::now()).await;

        let engine = SuggestionEngine::new(
            SuggestionConfig::default(),
            LocalCatalog::new(cache).shared(),
            Arc::clone(&history),
            trending,
        );
        Harness { engine, history }
    }

    #[tokio::test]
    async fn test_empty_input_blends_history_and_trending() {
        let h = harness(Vec::new(), vec!["Dune", "Shogun", "Heat"]).await;
        for term in ["heat", "alien", "up"] {
            h.history.record(term).await;
        }

        let suggestions = h.engine.generate("").await;
        assert_eq!(
            suggestions,
            vec!["up", "alien", "heat", "Dune", "Shogun", "Heat"]
        );
    }

    #[tokio::test]
    async fn test_empty_input_caps() {
        let trending: Vec<String> = (0..7).map(|i| format!("T{}", i)).collect();
        let h = harness(Vec::new(), trending.iter().map(String::as_str).collect()).await;
        for i in 0..7 {
            h.history.record(&format!("h{}", i)).await;
        }

        let suggestions = h.engine.generate("   ").await;
        assert_eq!(suggestions.len(), 8);
        assert_eq!(&suggestions[..5], &["h6", "h5", "h4", "h3", "h2"]);
        assert_eq!(&suggestions[5..], &["T0", "T1", "T2"]);
    }

    #[tokio::test]
    async fn test_priority_order() {
        let h = harness(
            vec![fixtures::movie("tt1", "Batman Begins", "2005")],
            vec!["The Batman", "Dune"],
        )
        .await;
        h.history.record("lego batman").await;
        h.history.record("batman returns").await;

        let suggestions = h.engine.generate("batman").await;
        assert_eq!(
            suggestions,
            vec!["batman returns", "lego batman", "Batman Begins", "The Batman"]
        );
    }

    #[tokio::test]
    async fn test_stage_caps() {
        let h = harness(Vec::new(), Vec::new()).await;
        for term in ["star a", "star b", "star c", "star d", "x star", "y star", "z star"] {
            h.history.record(term).await;
        }

        let suggestions = h.engine.generate("star").await;
        assert_eq!(
            suggestions,
            vec!["star d", "star c", "star b", "z star", "y star"]
        );
    }

    #[tokio::test]
    async fn test_later_stages_skip_earlier_picks() {
        let h = harness(
            vec![fixtures::movie("tt1", "Heat", "1995")],
            vec!["Heat"],
        )
        .await;
        h.history.record("Heat").await;

        assert_eq!(h.engine.generate("heat").await, vec!["Heat"]);
    }

    #[tokio::test]
    async fn test_accept_records_history() {
        let h = harness(Vec::new(), Vec::new()).await;
        assert!(h.engine.accept("Oppenheimer").await);
        assert_eq!(h.history.entries(), vec!["Oppenheimer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_computes_last_input_only() {
        let h = harness(Vec::new(), vec!["Alien", "Aliens", "Heat"]).await;

        h.engine.on_input("a");
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.engine.on_input("al");
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.engine.on_input("heat");

        // Within the window nothing is computed
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(h.engine.state().suggestions.is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let state = h.engine.state();
        assert_eq!(state.input, "heat");
        assert_eq!(state.suggestions, vec!["Heat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_computation() {
        let h = harness(Vec::new(), vec!["Heat"]).await;
        let mut rx = h.engine.subscribe();

        h.engine.on_input("heat");
        drop(h.engine);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.borrow_and_update().suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_trending_publishes_keywords() {
        let h = harness(Vec::new(), vec!["Heat"]).await;
        assert_eq!(h.engine.state().trending_keywords, vec!["Heat"]);

        h.engine.refresh_trending().await;
        assert_eq!(h.engine.state().trending_keywords, vec!["Heat"]);
    }
}
