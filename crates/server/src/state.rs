use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use cinefind_core::{
    AnalyticsHandle, Config, DailyQuota, HistoryStore, KeyValueStore, LocalCatalog,
    RemoteCatalog, ResultCache, SanitizedConfig, SearchOrchestrator, SuggestionEngine,
    TrendingKeywords, TrendingSource,
};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<SearchOrchestrator>,
    history: Arc<HistoryStore>,
    suggestions: Arc<SuggestionEngine>,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: Arc<SearchOrchestrator>,
        history: Arc<HistoryStore>,
        suggestions: Arc<SuggestionEngine>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            history,
            suggestions,
        }
    }

    /// Load persisted state from `store` and wire the search components.
    ///
    /// The cache, quota and history are read once here; afterwards every
    /// mutation is written back through the same store.
    pub async fn assemble(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteCatalog>,
        trending_source: Option<Arc<dyn TrendingSource>>,
        analytics: Option<AnalyticsHandle>,
    ) -> Self {
        let cache = ResultCache::load(Arc::clone(&store), config.cache.capacity).await;
        info!("Result cache loaded ({} items)", cache.len());
        let catalog = LocalCatalog::new(cache).shared();

        let quota = DailyQuota::load(
            Arc::clone(&store),
            config.quota.max_calls_per_window,
            config.quota.window(),
            Utc::now(),
        )
        .await;

        let history = Arc::new(
            HistoryStore::load(
                Arc::clone(&store),
                config.history.capacity,
                config.search.min_query_length,
            )
            .await,
        );

        let trending = Arc::new(TrendingKeywords::new(
            store,
            trending_source,
            config.suggestions.trending_freshness(),
        ));

        let mut orchestrator =
            SearchOrchestrator::new(config.search.clone(), Arc::clone(&catalog), quota, remote);
        if let Some(handle) = analytics {
            orchestrator = orchestrator.with_analytics(handle);
        }

        let suggestions = SuggestionEngine::new(
            config.suggestions.clone(),
            catalog,
            Arc::clone(&history),
            trending,
        );

        Self::new(
            config,
            Arc::new(orchestrator),
            history,
            Arc::new(suggestions),
        )
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }
}
