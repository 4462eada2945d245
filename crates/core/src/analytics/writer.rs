use std::sync::Arc;

use tokio::sync::mpsc;

use super::{AnalyticsEvent, AnalyticsEventEnvelope, AnalyticsHandle, AnalyticsSink};

/// Background task that receives analytics events and forwards them to a sink
pub struct AnalyticsWriter {
    rx: mpsc::Receiver<AnalyticsEventEnvelope>,
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsWriter {
    pub fn new(rx: mpsc::Receiver<AnalyticsEventEnvelope>, sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { rx, sink }
    }

    /// Run the writer, consuming events until every handle is dropped
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Analytics writer started");

        while let Some(envelope) = self.rx.recv().await {
            let result = match &envelope.event {
                AnalyticsEvent::SearchPerformed {
                    query,
                    result_count,
                    source,
                } => self.sink.record_search(query, *result_count, *source),
            };

            if let Err(e) = result {
                tracing::warn!("Failed to report analytics event: {}", e);
            }
        }

        tracing::info!("Analytics writer shutting down");
    }
}

/// Create a complete analytics system
///
/// Returns:
/// - `AnalyticsHandle` - for emitting events (clone this to share across tasks)
/// - `AnalyticsWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
pub fn create_analytics_system(
    sink: Arc<dyn AnalyticsSink>,
    buffer_size: usize,
) -> (AnalyticsHandle, AnalyticsWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = AnalyticsHandle::new(tx);
    let writer = AnalyticsWriter::new(rx, sink);
    (handle, writer)
}
