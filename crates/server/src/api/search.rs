//! Search session API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::debug;

use cinefind_core::searcher::normalize_query;
use cinefind_core::{QuotaStatus, SearchError, SearchState, TypeFilter};

use super::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub filter: TypeFilter,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub filter: TypeFilter,
}

fn search_error_status(err: &SearchError) -> StatusCode {
    match err {
        SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
        SearchError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        SearchError::Network(_) | SearchError::Api(_) => StatusCode::BAD_GATEWAY,
        SearchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        // Superseded by a newer search
        SearchError::Canceled => StatusCode::CONFLICT,
        SearchError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn into_api_error(err: SearchError) -> ApiError {
    api_error(search_error_status(&err), err.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/search
///
/// Submit a query: it is recorded in history, then searched from page 1.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchState>, ApiError> {
    let query = normalize_query(&body.query);
    if state.history().record(&query).await {
        debug!("Recorded '{}' in search history", query);
    }

    state
        .orchestrator()
        .search(&query, body.filter, 1, false)
        .await
        .map(Json)
        .map_err(into_api_error)
}

/// POST /api/v1/search/more
///
/// Append the next page. When there is nothing more to load the current
/// state is returned unchanged.
pub async fn load_more(State(state): State<Arc<AppState>>) -> Result<Json<SearchState>, ApiError> {
    let orchestrator = state.orchestrator();
    match orchestrator.load_more_results().await {
        Ok(Some(search_state)) => Ok(Json(search_state)),
        Ok(None) => Ok(Json(orchestrator.state())),
        Err(e) => Err(into_api_error(e)),
    }
}

/// POST /api/v1/search/filter
pub async fn change_filter(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FilterRequest>,
) -> Result<Json<SearchState>, ApiError> {
    let orchestrator = state.orchestrator();
    match orchestrator.change_filter(body.filter).await {
        Ok(Some(search_state)) => Ok(Json(search_state)),
        Ok(None) => Ok(Json(orchestrator.state())),
        Err(e) => Err(into_api_error(e)),
    }
}

/// DELETE /api/v1/search
pub async fn clear_search(State(state): State<Arc<AppState>>) -> StatusCode {
    state.orchestrator().clear_search();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/search/state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<SearchState> {
    Json(state.orchestrator().state())
}

/// GET /api/v1/quota
pub async fn get_quota(State(state): State<Arc<AppState>>) -> Json<QuotaStatus> {
    Json(state.orchestrator().quota_status().await)
}
