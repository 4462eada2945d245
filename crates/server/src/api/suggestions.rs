//! Suggestion API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use cinefind_core::SuggestionState;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub input: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    pub suggestion: String,
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub recorded: bool,
    pub history: Vec<String>,
}

/// GET /api/v1/suggestions
///
/// Last published suggestion state.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<SuggestionState> {
    Json(state.suggestions().state())
}

/// POST /api/v1/suggestions/input
///
/// Register a keystroke. Suggestions are published once the debounce window
/// passes without further input; poll `GET /suggestions` for them.
pub async fn input(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InputRequest>,
) -> (StatusCode, Json<SuggestionState>) {
    let suggestions = state.suggestions();
    suggestions.on_input(&body.text);
    (StatusCode::ACCEPTED, Json(suggestions.state()))
}

/// GET /api/v1/suggestions/generate?q=
///
/// Compute suggestions immediately, without debouncing.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenerateQuery>,
) -> Json<GenerateResponse> {
    let suggestions = state.suggestions().generate(&query.q).await;
    Json(GenerateResponse {
        input: query.q,
        suggestions,
    })
}

/// POST /api/v1/suggestions/accept
pub async fn accept(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AcceptRequest>,
) -> Json<AcceptResponse> {
    let recorded = state.suggestions().accept(&body.suggestion).await;
    Json(AcceptResponse {
        recorded,
        history: state.history().entries(),
    })
}
