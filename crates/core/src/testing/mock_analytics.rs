//! Recording analytics sink for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::analytics::{AnalyticsError, AnalyticsSink, SearchSource};

/// Sink that keeps every reported search in memory.
#[derive(Debug, Default)]
pub struct RecordingAnalyticsSink {
    searches: Mutex<Vec<(String, usize, SearchSource)>>,
    fail: AtomicBool,
}

impl RecordingAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reports fail (and not be recorded).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Reported searches as `(query, result_count, source)`.
    pub fn searches(&self) -> Vec<(String, usize, SearchSource)> {
        self.searches.lock().unwrap().clone()
    }
}

impl AnalyticsSink for RecordingAnalyticsSink {
    fn record_search(
        &self,
        query: &str,
        result_count: usize,
        source: SearchSource,
    ) -> Result<(), AnalyticsError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AnalyticsError::Sink("Mock failure".to_string()));
        }
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), result_count, source));
        Ok(())
    }
}
