//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search orchestration (outcomes, result counts)
//! - Remote catalog calls and quota
//! - Result cache size
//! - Suggestion generation

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Settled searches by outcome.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinefind_searches_total", "Total searches by outcome"),
        &["outcome"], // "local", "remote", "merged", "local_fallback", "none", "failed", "rate_limited"
    )
    .unwrap()
});

/// Results shown per settled search.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinefind_search_results",
            "Number of results shown per settled search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Remote Catalog Metrics
// =============================================================================

/// Remote catalog calls by status.
pub static REMOTE_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinefind_remote_calls_total", "Total remote catalog calls"),
        &["status"], // "success", "error", "canceled"
    )
    .unwrap()
});

/// Remote calls left in the current quota window.
pub static QUOTA_REMAINING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinefind_quota_remaining",
        "Remote calls remaining in the current quota window",
    )
    .unwrap()
});

// =============================================================================
// Cache and Suggestion Metrics
// =============================================================================

/// Items held by the result cache.
pub static CACHE_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("cinefind_cache_items", "Number of items in the result cache").unwrap()
});

/// Suggestion lists computed.
pub static SUGGESTIONS_GENERATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinefind_suggestions_generated_total",
        "Total suggestion lists generated",
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        // Remote
        Box::new(REMOTE_CALLS.clone()),
        Box::new(QUOTA_REMAINING.clone()),
        // Cache / suggestions
        Box::new(CACHE_ITEMS.clone()),
        Box::new(SUGGESTIONS_GENERATED.clone()),
    ]
}
