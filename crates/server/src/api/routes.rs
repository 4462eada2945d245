use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, history, middleware::metrics_middleware, search, suggestions};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Search session
        .route("/search", post(search::search))
        .route("/search", delete(search::clear_search))
        .route("/search/more", post(search::load_more))
        .route("/search/filter", post(search::change_filter))
        .route("/search/state", get(search::get_state))
        .route("/quota", get(search::get_quota))
        // Suggestions
        .route("/suggestions", get(suggestions::get_state))
        .route("/suggestions/input", post(suggestions::input))
        .route("/suggestions/generate", get(suggestions::generate))
        .route("/suggestions/accept", post(suggestions::accept))
        // History
        .route("/history", get(history::list_history))
        .route("/history", post(history::record))
        .route("/history", delete(history::clear_history))
        .route("/history/{term}", delete(history::delete_entry))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
