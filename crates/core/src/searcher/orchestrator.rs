//! Search orchestrator.
//!
//! Runs one search session at a time. A new search cancels the previous
//! session's token; results are only published while the publishing session
//! still holds an uncanceled token, checked under the session lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::SearchConfig;
use super::dedup::{append_unique, merge_page};
use super::rate_limiter::{DailyQuota, QuotaStatus};
use super::types::{page_count, LocalPage, SearchError, SearchFailure, SearchPhase, SearchState};
use crate::analytics::{AnalyticsEvent, AnalyticsHandle, SearchSource};
use crate::catalog::{CatalogItem, SharedCatalog, TypeFilter};
use crate::index::is_genre_query;
use crate::metrics;
use crate::remote::{RemoteCatalog, RemoteCatalogError, RemoteSearchPage, RemoteSearchRequest};

/// Trim and collapse internal whitespace.
pub fn normalize_query(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The in-flight search. Exactly one is current.
struct SearchSession {
    query: String,
    filter: TypeFilter,
    page: u32,
    token: CancellationToken,
}

/// Central search state machine.
pub struct SearchOrchestrator {
    config: SearchConfig,
    catalog: SharedCatalog,
    quota: AsyncMutex<DailyQuota>,
    remote: Arc<dyn RemoteCatalog>,
    analytics: Option<AnalyticsHandle>,
    state: watch::Sender<SearchState>,
    session: Mutex<Option<SearchSession>>,
}

impl SearchOrchestrator {
    pub fn new(
        config: SearchConfig,
        catalog: SharedCatalog,
        quota: DailyQuota,
        remote: Arc<dyn RemoteCatalog>,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            config,
            catalog,
            quota: AsyncMutex::new(quota),
            remote,
            analytics: None,
            state,
            session: Mutex::new(None),
        }
    }

    /// Report settled searches through `handle`.
    pub fn with_analytics(mut self, handle: AnalyticsHandle) -> Self {
        self.analytics = Some(handle);
        self
    }

    /// Current observable state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    pub async fn quota_status(&self) -> QuotaStatus {
        self.quota.lock().await.status(Utc::now())
    }

    /// Run a search for `term`.
    ///
    /// `append` only matters for `page > 1`: the page is appended to the
    /// results already shown instead of replacing them. Returns the state
    /// published when the search settled.
    pub async fn search(
        &self,
        term: &str,
        filter: TypeFilter,
        page: u32,
        append: bool,
    ) -> Result<SearchState, SearchError> {
        let query = normalize_query(term);
        if query.chars().count() < self.config.min_query_length.max(1) {
            return Err(SearchError::EmptyQuery);
        }
        let page = page.max(1);
        let token = self.begin(&query, filter, page, append);

        let local = if is_genre_query(&query) {
            debug!("Genre query '{}', deferring to remote", query);
            LocalPage::default()
        } else {
            self.local_page(&query, filter, page).await
        };

        let wants_remote = page > 1
            || local.total < self.config.sufficiency_threshold
            || local.results.is_empty();
        if !wants_remote {
            debug!(
                "Remote skipped: {} local matches for '{}' are sufficient",
                local.total, query
            );
            return self.settle_local(&token, &query, page, append, local, SearchSource::Local);
        }

        if token.is_cancelled() {
            return Err(SearchError::Canceled);
        }

        let admitted = self.quota.lock().await.try_acquire(Utc::now()).await;
        if !admitted {
            info!("Remote quota exhausted; not searching '{}' remotely", query);
            return self.settle_failure(&token, &query, page, append, local, SearchError::RateLimited);
        }

        let request = RemoteSearchRequest::new(query.clone(), filter, page);
        let result = tokio::select! {
            _ = token.cancelled() => Err(RemoteCatalogError::Canceled),
            result = self.remote.search(&request, &token) => result,
        };

        match result {
            Ok(remote_page) => {
                metrics::REMOTE_CALLS.with_label_values(&["success"]).inc();
                self.settle_remote(&token, &query, page, append, local, remote_page)
                    .await
            }
            Err(RemoteCatalogError::Canceled) => {
                metrics::REMOTE_CALLS.with_label_values(&["canceled"]).inc();
                debug!("Remote search for '{}' canceled", query);
                Err(SearchError::Canceled)
            }
            Err(e) => {
                metrics::REMOTE_CALLS.with_label_values(&["error"]).inc();
                warn!("Remote search for '{}' ({}) failed: {}", query, self.remote.name(), e);
                self.settle_failure(&token, &query, page, append, local, SearchError::from(e))
            }
        }
    }

    /// Fetch and append the next page of the current query.
    ///
    /// Returns `Ok(None)` when there is nothing to load: a load is already
    /// running, no query is active, or the last page was reached.
    pub async fn load_more_results(&self) -> Result<Option<SearchState>, SearchError> {
        let (query, filter, next_page) = {
            let state = self.state.borrow();
            if state.is_loading_more() || state.query.is_empty() || !state.has_more_pages {
                return Ok(None);
            }
            (state.query.clone(), state.filter, state.current_page + 1)
        };
        self.search(&query, filter, next_page, true).await.map(Some)
    }

    /// Re-run the current query at page 1 with another filter.
    ///
    /// Without an active query only the filter is updated.
    pub async fn change_filter(&self, filter: TypeFilter) -> Result<Option<SearchState>, SearchError> {
        let query = self.state.borrow().query.clone();
        if query.is_empty() {
            self.state.send_modify(|state| state.filter = filter);
            return Ok(None);
        }
        self.search(&query, filter, 1, false).await.map(Some)
    }

    /// Cancel any in-flight search and reset the observable state.
    ///
    /// Cache, quota and history are untouched.
    pub fn clear_search(&self) {
        let mut session = self.lock_session();
        if let Some(previous) = session.take() {
            previous.token.cancel();
        }
        self.state.send_replace(SearchState::default());
        debug!("Search cleared");
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<SearchSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a new session, canceling the previous one, and publish the
    /// loading phase.
    fn begin(&self, query: &str, filter: TypeFilter, page: u32, append: bool) -> CancellationToken {
        let token = CancellationToken::new();
        let mut session = self.lock_session();
        if let Some(previous) = session.take() {
            if !previous.token.is_cancelled() {
                debug!(
                    "Superseding search '{}' ({:?}, page {})",
                    previous.query, previous.filter, previous.page
                );
                previous.token.cancel();
            }
        }
        *session = Some(SearchSession {
            query: query.to_string(),
            filter,
            page,
            token: token.clone(),
        });

        let phase = if page > 1 && append {
            SearchPhase::LoadingMore
        } else {
            SearchPhase::Searching
        };
        self.state.send_modify(|state| {
            if page == 1 {
                *state = SearchState {
                    query: query.to_string(),
                    filter,
                    ..Default::default()
                };
            } else {
                state.query = query.to_string();
                state.filter = filter;
                state.error = None;
            }
            state.phase = phase;
        });
        token
    }

    /// Apply `update` unless the session owning `token` was superseded.
    fn publish<F>(&self, token: &CancellationToken, update: F) -> Result<SearchState, SearchError>
    where
        F: FnOnce(&mut SearchState),
    {
        let _session = self.lock_session();
        if token.is_cancelled() {
            return Err(SearchError::Canceled);
        }
        self.state.send_modify(update);
        Ok(self.state.borrow().clone())
    }

    async fn local_page(&self, query: &str, filter: TypeFilter, page: u32) -> LocalPage {
        let matches = self
            .catalog
            .lock()
            .await
            .search(query, None, &self.config.fuzzy);

        let filtered: Vec<Arc<CatalogItem>> = matches
            .into_iter()
            .filter(|m| filter.matches(m.item.item_type))
            .map(|m| m.item)
            .collect();

        let total = filtered.len();
        let page_size = self.config.page_size.max(1);
        let start = (page as usize - 1).saturating_mul(page_size);
        let results: Vec<Arc<CatalogItem>> =
            filtered.into_iter().skip(start).take(page_size).collect();

        LocalPage {
            has_more: start + results.len() < total,
            results,
            total,
        }
    }

    fn settle_local(
        &self,
        token: &CancellationToken,
        query: &str,
        page: u32,
        append: bool,
        local: LocalPage,
        source: SearchSource,
    ) -> Result<SearchState, SearchError> {
        let local_pages = page_count(local.total, self.config.page_size);
        let state = self.publish(token, move |state| {
            // Past page 1 the totals already shown may come from the remote
            let (total_results, total_pages) = if page > 1 {
                (
                    state.total_results.max(local.total),
                    state.total_pages.max(local_pages),
                )
            } else {
                (local.total, local_pages)
            };
            state.results = if page > 1 && append {
                append_unique(&state.results, local.results)
            } else {
                local.results
            };
            state.phase = SearchPhase::Settled;
            state.error = None;
            state.total_results = total_results;
            state.total_pages = total_pages;
            state.has_more_pages = page < total_pages;
            state.current_page = page;
        })?;

        self.report(query, state.results.len(), source, source.as_str());
        Ok(state)
    }

    async fn settle_remote(
        &self,
        token: &CancellationToken,
        query: &str,
        page: u32,
        append: bool,
        local: LocalPage,
        remote_page: RemoteSearchPage,
    ) -> Result<SearchState, SearchError> {
        let remote_total = remote_page.total_results as usize;
        let remote_items: Vec<CatalogItem> = remote_page
            .items
            .into_iter()
            .map(|item| self.normalize_item(item))
            .collect();

        let source = match (remote_items.is_empty(), local.results.is_empty()) {
            (false, true) => SearchSource::Remote,
            (false, false) => SearchSource::Merged,
            (true, false) => SearchSource::Local,
            (true, true) => SearchSource::None,
        };

        let total_results = local.total.max(remote_total);
        let total_pages = page_count(local.total, self.config.page_size)
            .max(page_count(remote_total, self.config.page_size));
        let page_items = merge_page(
            remote_items.iter().cloned().map(Arc::new).collect(),
            local.results,
        );

        let state = self.publish(token, move |state| {
            let (total_results, total_pages) = if page > 1 {
                (
                    state.total_results.max(total_results),
                    state.total_pages.max(total_pages),
                )
            } else {
                (total_results, total_pages)
            };
            state.results = if page > 1 && append {
                append_unique(&state.results, page_items)
            } else {
                page_items
            };
            state.phase = SearchPhase::Settled;
            state.error = None;
            state.total_results = total_results;
            state.total_pages = total_pages;
            state.has_more_pages = page < total_pages;
            state.current_page = page;
        })?;

        let inserted = self.catalog.lock().await.upsert_all(remote_items).await;
        if inserted > 0 {
            debug!("Cached {} new items from remote search '{}'", inserted, query);
        }

        self.report(query, state.results.len(), source, source.as_str());
        Ok(state)
    }

    /// Fall back to local results, or publish `err` when there are none.
    fn settle_failure(
        &self,
        token: &CancellationToken,
        query: &str,
        page: u32,
        append: bool,
        local: LocalPage,
        err: SearchError,
    ) -> Result<SearchState, SearchError> {
        if !local.results.is_empty() {
            debug!("Showing {} local results for '{}' after: {}", local.results.len(), query, err);
            return self.settle_local(token, query, page, append, local, SearchSource::LocalFallback);
        }

        let failure = SearchFailure::from(&err);
        let state = self.publish(token, move |state| {
            if page == 1 {
                state.results.clear();
                state.total_results = 0;
                state.total_pages = 0;
                state.has_more_pages = false;
                state.current_page = 0;
            }
            state.phase = SearchPhase::Failed;
            state.error = Some(failure);
        })?;

        let outcome = match err {
            SearchError::RateLimited => "rate_limited",
            _ => "failed",
        };
        self.report(query, state.results.len(), SearchSource::None, outcome);
        Err(err)
    }

    fn normalize_item(&self, mut item: CatalogItem) -> CatalogItem {
        if item.has_missing_poster() {
            item.poster = self.config.placeholder_poster_url.clone();
        }
        item
    }

    fn report(&self, query: &str, result_count: usize, source: SearchSource, outcome: &str) {
        metrics::SEARCHES_TOTAL.with_label_values(&[outcome]).inc();
        metrics::SEARCH_RESULTS
            .with_label_values(&[])
            .observe(result_count as f64);

        if let Some(analytics) = &self.analytics {
            analytics.try_emit(AnalyticsEvent::SearchPerformed {
                query: query.to_string(),
                result_count,
                source,
            });
        }
    }
}
