//! Daily quota tracker for remote catalog calls.
//!
//! The remote API grants a fixed number of calls per rolling window. The
//! tracker is a pure admission check: callers ask [`DailyQuota::can_call`]
//! before dispatching and [`DailyQuota::record_call`] when they do. A refused
//! call is reported as rate limited, never retried.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metrics;
use crate::storage::{load_json, save_json, KeyValueStore, RATE_LIMITER_KEY};

/// Default calls allowed per window.
pub const DEFAULT_MAX_CALLS_PER_WINDOW: u32 = 1000;

/// Default window length.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Persisted quota state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimiterState {
    /// Calls made in the current window.
    pub calls: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
}

/// Quota status for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaStatus {
    pub calls: u32,
    pub max_calls: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Remote call quota with a rolling reset.
pub struct DailyQuota {
    state: RateLimiterState,
    max_calls: u32,
    window: Duration,
    store: Arc<dyn KeyValueStore>,
}

impl DailyQuota {
    /// Create a fresh quota whose first window ends at `now + window`.
    pub fn new(store: Arc<dyn KeyValueStore>, max_calls: u32, window: Duration, now: DateTime<Utc>) -> Self {
        Self {
            state: RateLimiterState {
                calls: 0,
                reset_at: now + window,
            },
            max_calls,
            window,
            store,
        }
    }

    /// Load the persisted state, or start fresh when none is stored.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        max_calls: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let mut quota = Self::new(store, max_calls, window, now);
        if let Some(state) =
            load_json::<RateLimiterState>(quota.store.as_ref(), RATE_LIMITER_KEY).await
        {
            info!(
                "Loaded remote quota: {} calls used, window resets at {}",
                state.calls, state.reset_at
            );
            quota.state = state;
        }
        quota
    }

    /// Start a new window if the current one has ended.
    ///
    /// Returns whether a reset happened.
    fn roll_window(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.state.reset_at {
            return false;
        }
        debug!(
            "Quota window ended at {}; resetting {} calls",
            self.state.reset_at, self.state.calls
        );
        self.state = RateLimiterState {
            calls: 0,
            reset_at: now + self.window,
        };
        true
    }

    /// Whether a remote call is admitted at `now`.
    pub fn can_call(&mut self, now: DateTime<Utc>) -> bool {
        self.roll_window(now);
        self.state.calls < self.max_calls
    }

    /// Count a dispatched call and persist the new state.
    pub async fn record_call(&mut self, now: DateTime<Utc>) {
        self.roll_window(now);
        self.state.calls = self.state.calls.saturating_add(1);
        save_json(self.store.as_ref(), RATE_LIMITER_KEY, &self.state).await;
        metrics::QUOTA_REMAINING.set(self.remaining() as i64);
    }

    /// Admit and record a call in one step.
    ///
    /// Returns `false` (and records nothing) when the quota is exhausted.
    pub async fn try_acquire(&mut self, now: DateTime<Utc>) -> bool {
        if !self.can_call(now) {
            return false;
        }
        self.record_call(now).await;
        true
    }

    fn remaining(&self) -> u32 {
        self.max_calls.saturating_sub(self.state.calls)
    }

    /// Current status, after any due reset.
    pub fn status(&mut self, now: DateTime<Utc>) -> QuotaStatus {
        self.roll_window(now);
        QuotaStatus {
            calls: self.state.calls,
            max_calls: self.max_calls,
            remaining: self.remaining(),
            reset_at: self.state.reset_at,
        }
    }

    /// Raw state, without applying a due reset.
    pub fn state(&self) -> RateLimiterState {
        self.state
    }
}
