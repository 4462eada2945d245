//! Search history API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub term: String,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub recorded: bool,
    pub entries: Vec<String>,
}

/// GET /api/v1/history
pub async fn list_history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        entries: state.history().entries(),
    })
}

/// POST /api/v1/history
pub async fn record(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecordRequest>,
) -> Json<RecordResponse> {
    let history = state.history();
    let recorded = history.record(&body.term).await;
    Json(RecordResponse {
        recorded,
        entries: history.entries(),
    })
}

/// DELETE /api/v1/history
pub async fn clear_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.history().clear_all().await;
    StatusCode::NO_CONTENT
}

/// DELETE /api/v1/history/{term}
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(term): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.history();
    if !history.delete(&term).await {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("'{}' is not in the search history", term),
        ));
    }
    Ok(Json(HistoryResponse {
        entries: history.entries(),
    }))
}
