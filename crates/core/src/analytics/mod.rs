//! Fire-and-forget search analytics.
//!
//! Settled searches are reported through an [`AnalyticsHandle`], which pushes
//! events onto a bounded channel. An [`AnalyticsWriter`] drains the channel in
//! the background and forwards each event to an [`AnalyticsSink`]. Reporting
//! never blocks or fails a search.

mod handle;
mod writer;

pub use handle::{AnalyticsEventEnvelope, AnalyticsHandle};
pub use writer::{create_analytics_system, AnalyticsWriter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the results of a settled search came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    /// Local index only; remote was not needed.
    Local,
    /// Remote results only.
    Remote,
    /// Remote results merged with local ones.
    Merged,
    /// Remote failed or was refused; local results shown instead.
    LocalFallback,
    /// Nothing displayable.
    None,
}

impl SearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::Local => "local",
            SearchSource::Remote => "remote",
            SearchSource::Merged => "merged",
            SearchSource::LocalFallback => "local_fallback",
            SearchSource::None => "none",
        }
    }
}

/// Analytics events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    SearchPerformed {
        query: String,
        result_count: usize,
        source: SearchSource,
    },
}

/// Errors reported by analytics sinks.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Analytics sink error: {0}")]
    Sink(String),
}

/// Destination for analytics events.
pub trait AnalyticsSink: Send + Sync {
    fn record_search(
        &self,
        query: &str,
        result_count: usize,
        source: SearchSource,
    ) -> Result<(), AnalyticsError>;
}

/// Sink that writes events to the log under the `analytics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn record_search(
        &self,
        query: &str,
        result_count: usize,
        source: SearchSource,
    ) -> Result<(), AnalyticsError> {
        tracing::info!(
            target: "analytics",
            query,
            result_count,
            source = source.as_str(),
            "search performed"
        );
        Ok(())
    }
}
