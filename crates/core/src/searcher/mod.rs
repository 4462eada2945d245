//! Hybrid local/remote search.
//!
//! The [`SearchOrchestrator`] answers a query from the local fuzzy index
//! first and falls back to (or merges with) the remote catalog when local
//! results are thin, subject to the daily [`DailyQuota`].

mod config;
mod dedup;
mod orchestrator;
mod rate_limiter;
mod types;

pub use config::{QuotaConfig, SearchConfig};
pub use dedup::{append_unique, merge_page};
pub use orchestrator::{normalize_query, SearchOrchestrator};
pub use rate_limiter::{
    DailyQuota, QuotaStatus, RateLimiterState, DEFAULT_MAX_CALLS_PER_WINDOW, DEFAULT_WINDOW_HOURS,
};
pub use types::*;
