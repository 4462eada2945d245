//! Search lifecycle integration tests.
//!
//! These tests drive the orchestrator end to end over a SQLite-backed store
//! and a mock remote catalog:
//! idle -> searching -> settled/failed, load-more, cancellation and fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;
use tokio::sync::mpsc;

use cinefind_core::{
    analytics::AnalyticsEventEnvelope,
    testing::{fixtures, MockRemoteCatalog},
    AnalyticsEvent, AnalyticsHandle, CatalogItem, DailyQuota, IndexState, KeyValueStore,
    LocalCatalog, RemoteCatalogError, ResultCache, SearchConfig, SearchError, SearchErrorKind,
    SearchOrchestrator, SearchPhase, SearchSource, SqliteStore, TypeFilter,
};

/// Test helper wiring the orchestrator to a temp database and a mock remote.
struct TestHarness {
    orchestrator: SearchOrchestrator,
    remote: Arc<MockRemoteCatalog>,
    store: Arc<SqliteStore>,
    events: mpsc::Receiver<AnalyticsEventEnvelope>,
    _temp_dir: TempDir,
}

impl TestHarness {
    async fn new(max_calls: u32, cached: Vec<CatalogItem>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteStore::new(&temp_dir.path().join("test.db")).expect("Failed to open store"),
        );
        let dyn_store: Arc<dyn KeyValueStore> = store.clone();

        let mut cache = ResultCache::load(Arc::clone(&dyn_store), 100).await;
        cache.upsert_all(cached).await;
        let quota = DailyQuota::load(dyn_store, max_calls, chrono::Duration::hours(24), Utc::now()).await;

        let remote = Arc::new(MockRemoteCatalog::new());
        let (tx, events) = mpsc::channel(64);
        let orchestrator = SearchOrchestrator::new(
            SearchConfig::default(),
            LocalCatalog::new(cache).shared(),
            quota,
            remote.clone(),
        )
        .with_analytics(AnalyticsHandle::new(tx));

        Self {
            orchestrator,
            remote,
            store,
            events,
            _temp_dir: temp_dir,
        }
    }

    fn drain_events(&mut self) -> Vec<AnalyticsEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = self.events.try_recv() {
            events.push(envelope.event);
        }
        events
    }
}

fn ids(items: &[Arc<CatalogItem>]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[tokio::test]
async fn test_first_search_on_empty_cache() {
    let mut h = TestHarness::new(1000, Vec::new()).await;
    let inception = fixtures::movie("tt1375666", "Inception", "2010");
    h.remote
        .set_page("inception", 1, fixtures::remote_page(vec![inception.clone()]))
        .await;

    let state = h
        .orchestrator
        .search("inception", TypeFilter::All, 1, false)
        .await
        .unwrap();

    assert_eq!(state.phase, SearchPhase::Settled);
    assert_eq!(state.results.len(), 1);
    assert_eq!(*state.results[0], inception);
    assert_eq!(state.total_results, 1);
    assert_eq!(state.total_pages, 1);
    assert!(!state.has_more_pages);
    assert!(state.error.is_none());

    {
        let catalog = h.orchestrator.catalog().lock().await;
        assert!(catalog.cache().contains("tt1375666"));
        assert_eq!(catalog.index_state(), IndexState::Stale);
    }

    assert_eq!(h.orchestrator.quota_status().await.calls, 1);
    assert_eq!(
        h.drain_events(),
        vec![AnalyticsEvent::SearchPerformed {
            query: "inception".to_string(),
            result_count: 1,
            source: SearchSource::Remote,
        }]
    );
}

#[tokio::test]
async fn test_cached_item_found_locally_on_next_search() {
    let h = TestHarness::new(1000, Vec::new()).await;
    h.remote
        .set_page(
            "inception",
            1,
            fixtures::remote_page(vec![fixtures::movie("tt1375666", "Inception", "2010")]),
        )
        .await;
    h.orchestrator
        .search("inception", TypeFilter::All, 1, false)
        .await
        .unwrap();

    // The remote now knows nothing; the cached copy still answers
    h.remote.set_page("incepton", 1, fixtures::remote_page(Vec::new())).await;
    let state = h
        .orchestrator
        .search("incepton", TypeFilter::All, 1, false)
        .await
        .unwrap();

    assert_eq!(ids(&state.results), vec!["tt1375666"]);
    assert_eq!(
        h.orchestrator.catalog().lock().await.index_state(),
        IndexState::Current
    );
}

#[tokio::test]
async fn test_new_search_cancels_previous() {
    let mut h = TestHarness::new(1000, Vec::new()).await;
    h.remote
        .set_page("a", 1, fixtures::remote_page(vec![fixtures::movie("tt0000001", "Alpha", "2001")]))
        .await;
    h.remote.set_delay("a", Duration::from_millis(300)).await;
    h.remote
        .set_page("b", 1, fixtures::remote_page(vec![fixtures::movie("tt0000002", "Bravo", "2002")]))
        .await;

    let remote = Arc::clone(&h.remote);
    let orchestrator = Arc::new(h.orchestrator);

    let first = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.search("a", TypeFilter::All, 1, false).await })
    };
    while remote.call_count().await == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let second = orchestrator
        .search("b", TypeFilter::All, 1, false)
        .await
        .unwrap();
    assert_eq!(ids(&second.results), vec!["tt0000002"]);

    let first = first.await.unwrap();
    assert_eq!(first.unwrap_err(), SearchError::Canceled);

    // Well past the canceled call's latency nothing has changed
    tokio::time::sleep(Duration::from_millis(400)).await;
    let state = orchestrator.state();
    assert_eq!(state.query, "b");
    assert_eq!(ids(&state.results), vec!["tt0000002"]);
    assert!(!orchestrator.catalog().lock().await.cache().contains("tt0000001"));

    let mut settled = Vec::new();
    while let Ok(envelope) = h.events.try_recv() {
        settled.push(envelope.event);
    }
    assert_eq!(settled.len(), 1);
}

#[tokio::test]
async fn test_remote_fields_win_over_local() {
    let h = TestHarness::new(1000, vec![fixtures::movie("tt1", "Xanadu", "1980")]).await;
    h.remote
        .set_page("xanadu", 1, fixtures::remote_page(vec![fixtures::movie("tt1", "X", "1980")]))
        .await;

    let state = h
        .orchestrator
        .search("xanadu", TypeFilter::All, 1, false)
        .await
        .unwrap();

    assert_eq!(state.results.len(), 1);
    assert_eq!(state.results[0].id, "tt1");
    assert_eq!(state.results[0].title, "X");
}

#[tokio::test]
async fn test_remote_first_then_local() {
    let h = TestHarness::new(
        1000,
        vec![
            fixtures::movie("tt10", "Heat", "1995"),
            fixtures::movie("tt11", "Heat Wave", "1990"),
        ],
    )
    .await;
    h.remote
        .set_page(
            "heat",
            1,
            fixtures::remote_page_with_total(
                vec![
                    fixtures::movie("tt20", "The Heat", "2013"),
                    fixtures::movie("tt10", "Heat", "1995"),
                ],
                35,
            ),
        )
        .await;

    let state = h
        .orchestrator
        .search("heat", TypeFilter::All, 1, false)
        .await
        .unwrap();

    assert_eq!(ids(&state.results), vec!["tt20", "tt10", "tt11"]);
    assert_eq!(state.total_results, 35);
    assert_eq!(state.total_pages, 4);
    assert!(state.has_more_pages);
}

#[tokio::test]
async fn test_network_failure_falls_back_to_local() {
    let mut h = TestHarness::new(1000, vec![fixtures::movie("tt1", "Alien", "1979")]).await;
    h.remote
        .set_next_error(RemoteCatalogError::Network("connection reset".into()))
        .await;

    let state = h
        .orchestrator
        .search("alien", TypeFilter::All, 1, false)
        .await
        .unwrap();

    assert!(state.error.is_none());
    assert_eq!(ids(&state.results), vec!["tt1"]);
    assert_eq!(state.phase, SearchPhase::Settled);
    assert!(matches!(
        h.drain_events().as_slice(),
        [AnalyticsEvent::SearchPerformed {
            source: SearchSource::LocalFallback,
            ..
        }]
    ));
}

#[tokio::test]
async fn test_failure_without_local_results_is_published() {
    let h = TestHarness::new(1000, Vec::new()).await;
    h.remote.set_next_error(RemoteCatalogError::Timeout).await;

    let err = h
        .orchestrator
        .search("alien", TypeFilter::All, 1, false)
        .await
        .unwrap_err();
    assert_eq!(err, SearchError::Timeout);

    let state = h.orchestrator.state();
    assert_eq!(state.phase, SearchPhase::Failed);
    assert_eq!(state.error.as_ref().unwrap().kind, SearchErrorKind::Timeout);
    assert!(state.results.is_empty());
}

#[tokio::test]
async fn test_genre_query_bypasses_local_index() {
    let h = TestHarness::new(1000, vec![fixtures::movie("tt1", "Comedy Central Roast", "2011")]).await;
    h.remote
        .set_page("comedy", 1, fixtures::remote_page(vec![fixtures::movie("tt2", "Airplane!", "1980")]))
        .await;

    let state = h
        .orchestrator
        .search("comedy", TypeFilter::All, 1, false)
        .await
        .unwrap();

    assert_eq!(h.remote.call_count().await, 1);
    // The cached "Comedy Central Roast" is not merged in
    assert_eq!(ids(&state.results), vec!["tt2"]);
    // Only marked stale by the insert; no local read ever built it
    assert_eq!(
        h.orchestrator.catalog().lock().await.index_state(),
        IndexState::Stale
    );
}

#[tokio::test]
async fn test_genre_query_respects_quota() {
    let h = TestHarness::new(0, vec![fixtures::movie("tt1", "Comedy Central Roast", "2011")]).await;

    let err = h
        .orchestrator
        .search("comedy movies", TypeFilter::All, 1, false)
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::RateLimited);
    assert_eq!(h.remote.call_count().await, 0);
    assert_eq!(
        h.orchestrator.catalog().lock().await.index_state(),
        IndexState::Absent
    );
}

#[tokio::test]
async fn test_rate_limited_without_local_results() {
    let h = TestHarness::new(1, Vec::new()).await;
    h.orchestrator
        .search("heat", TypeFilter::All, 1, false)
        .await
        .unwrap();

    let err = h
        .orchestrator
        .search("ronin", TypeFilter::All, 1, false)
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::RateLimited);
    let state = h.orchestrator.state();
    assert_eq!(state.phase, SearchPhase::Failed);
    assert_eq!(state.error.as_ref().unwrap().kind, SearchErrorKind::RateLimited);
    assert_eq!(h.remote.call_count().await, 1);
}

#[tokio::test]
async fn test_rate_limited_with_local_results_shows_them() {
    let h = TestHarness::new(0, vec![fixtures::movie("tt1", "Ronin", "1998")]).await;

    let state = h
        .orchestrator
        .search("ronin", TypeFilter::All, 1, false)
        .await
        .unwrap();

    assert!(state.error.is_none());
    assert_eq!(ids(&state.results), vec!["tt1"]);
    assert_eq!(h.remote.call_count().await, 0);
}

#[tokio::test]
async fn test_load_more_appends_and_dedups() {
    let h = TestHarness::new(1000, Vec::new()).await;
    let page1 = fixtures::numbered_movies("tt", "Star", 10);
    let mut page2 = fixtures::numbered_movies("tu", "Star", 10);
    page2[0] = page1[9].clone();
    h.remote
        .set_page("star", 1, fixtures::remote_page_with_total(page1, 25))
        .await;
    h.remote
        .set_page("star", 2, fixtures::remote_page_with_total(page2, 25))
        .await;

    h.orchestrator
        .search("star", TypeFilter::All, 1, false)
        .await
        .unwrap();
    let state = h.orchestrator.load_more_results().await.unwrap().unwrap();

    assert_eq!(state.current_page, 2);
    assert_eq!(state.results.len(), 19);
    assert_eq!(state.total_pages, 3);
    assert!(state.has_more_pages);
    assert_eq!(state.phase, SearchPhase::Settled);
}

#[tokio::test]
async fn test_load_more_failure_keeps_results() {
    let h = TestHarness::new(1000, Vec::new()).await;
    h.remote
        .set_page(
            "star",
            1,
            fixtures::remote_page_with_total(fixtures::numbered_movies("tt", "Star", 10), 25),
        )
        .await;
    h.orchestrator
        .search("star", TypeFilter::All, 1, false)
        .await
        .unwrap();

    // Page 1 items are cached now, but local page 2 is empty
    h.remote
        .set_next_error(RemoteCatalogError::Api("Something went wrong.".into()))
        .await;
    let err = h.orchestrator.load_more_results().await.unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::Api);

    let state = h.orchestrator.state();
    assert_eq!(state.phase, SearchPhase::Failed);
    assert_eq!(state.results.len(), 10);
    assert_eq!(state.current_page, 1);
    assert!(state.has_more_pages);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let h = TestHarness::new(1000, Vec::new()).await;
    h.remote
        .set_page(
            "inception",
            1,
            fixtures::remote_page(vec![fixtures::movie("tt1375666", "Inception", "2010")]),
        )
        .await;
    h.orchestrator
        .search("inception", TypeFilter::All, 1, false)
        .await
        .unwrap();

    let store: Arc<dyn KeyValueStore> = h.store.clone();
    let cache = ResultCache::load(Arc::clone(&store), 100).await;
    assert!(cache.contains("tt1375666"));

    let quota = DailyQuota::load(store, 1000, chrono::Duration::hours(24), Utc::now()).await;
    assert_eq!(quota.state().calls, 1);
}
