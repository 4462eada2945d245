//! Types for the search state machine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogItem, TypeFilter};
use crate::remote::RemoteCatalogError;

/// Lifecycle phase of the current search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// No search has run, or it was cleared.
    #[default]
    Idle,
    /// A page-1 (or replacing) request is in flight.
    Searching,
    /// An appending request for the next page is in flight.
    LoadingMore,
    Settled,
    Failed,
}

/// Category of a search failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchErrorKind {
    EmptyQuery,
    RateLimited,
    Network,
    Timeout,
    Api,
    Canceled,
    Unknown,
}

/// Errors surfaced by the search orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search query is too short")]
    EmptyQuery,

    #[error("Daily search limit reached, try again later")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Search timed out")]
    Timeout,

    #[error("Catalog service error: {0}")]
    Api(String),

    #[error("Search canceled")]
    Canceled,

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            SearchError::EmptyQuery => SearchErrorKind::EmptyQuery,
            SearchError::RateLimited => SearchErrorKind::RateLimited,
            SearchError::Network(_) => SearchErrorKind::Network,
            SearchError::Timeout => SearchErrorKind::Timeout,
            SearchError::Api(_) => SearchErrorKind::Api,
            SearchError::Canceled => SearchErrorKind::Canceled,
            SearchError::Unknown(_) => SearchErrorKind::Unknown,
        }
    }
}

impl From<RemoteCatalogError> for SearchError {
    fn from(err: RemoteCatalogError) -> Self {
        match err {
            RemoteCatalogError::Network(msg) => SearchError::Network(msg),
            RemoteCatalogError::Timeout => SearchError::Timeout,
            RemoteCatalogError::Api(msg) => SearchError::Api(msg),
            RemoteCatalogError::Parse(msg) => SearchError::Api(msg),
            RemoteCatalogError::Canceled => SearchError::Canceled,
            RemoteCatalogError::NotConfigured(msg) => SearchError::Unknown(msg),
        }
    }
}

/// Error as published in [`SearchState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFailure {
    pub kind: SearchErrorKind,
    pub message: String,
}

impl From<&SearchError> for SearchFailure {
    fn from(err: &SearchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Observable search state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub query: String,
    pub filter: TypeFilter,
    pub results: Vec<Arc<CatalogItem>>,
    pub phase: SearchPhase,
    pub error: Option<SearchFailure>,
    pub has_more_pages: bool,
    pub total_results: usize,
    pub total_pages: u32,
    pub current_page: u32,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    pub fn is_loading_more(&self) -> bool {
        self.phase == SearchPhase::LoadingMore
    }
}

/// One page of local index matches.
#[derive(Debug, Clone, Default)]
pub struct LocalPage {
    pub results: Vec<Arc<CatalogItem>>,
    pub has_more: bool,
    /// Matches across all pages.
    pub total: usize,
}

/// Pages needed for `total` results.
pub fn page_count(total: usize, page_size: usize) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size) as u32
}
