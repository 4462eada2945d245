pub mod analytics;
pub mod catalog;
pub mod config;
pub mod history;
pub mod index;
pub mod metrics;
pub mod remote;
pub mod searcher;
pub mod storage;
pub mod suggestions;
pub mod testing;

pub use analytics::{
    create_analytics_system, AnalyticsEvent, AnalyticsHandle, AnalyticsSink, AnalyticsWriter,
    SearchSource, TracingAnalyticsSink,
};
pub use catalog::{
    CatalogItem, ItemType, LocalCatalog, ResultCache, SharedCatalog, TypeFilter,
    DEFAULT_CACHE_CAPACITY,
};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, SanitizedConfig, StorageBackend,
};
pub use history::{HistoryStore, DEFAULT_HISTORY_CAPACITY};
pub use index::{is_genre_query, FuzzyIndex, FuzzyMatch, FuzzyOptions, IndexState};
pub use remote::{
    DisabledRemoteCatalog, OmdbClient, OmdbConfig, RemoteCatalog, RemoteCatalogError,
    RemoteSearchPage, RemoteSearchRequest, TmdbConfig, TmdbTrendingClient, TrendingSource,
};
pub use searcher::{
    DailyQuota, QuotaConfig, QuotaStatus, SearchConfig, SearchError, SearchErrorKind,
    SearchFailure, SearchOrchestrator, SearchPhase, SearchState,
};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
pub use suggestions::{
    SuggestionConfig, SuggestionEngine, SuggestionState, TrendingKeywords, TrendingOrigin,
};
