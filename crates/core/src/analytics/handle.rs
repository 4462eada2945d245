use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::AnalyticsEvent;

/// Envelope wrapping an analytics event with metadata
#[derive(Debug, Clone)]
pub struct AnalyticsEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: AnalyticsEvent,
}

/// Handle for emitting analytics events
///
/// Cheaply cloneable. Events are sent through a bounded channel to be
/// delivered by the AnalyticsWriter.
#[derive(Clone)]
pub struct AnalyticsHandle {
    tx: mpsc::Sender<AnalyticsEventEnvelope>,
}

impl AnalyticsHandle {
    pub fn new(tx: mpsc::Sender<AnalyticsEventEnvelope>) -> Self {
        Self { tx }
    }

    /// Try to emit an event without blocking
    ///
    /// Returns true if the event was queued. A full or closed channel drops
    /// the event with a warning.
    pub fn try_emit(&self, event: AnalyticsEvent) -> bool {
        let envelope = AnalyticsEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Dropped analytics event: {}", e);
                false
            }
        }
    }
}
