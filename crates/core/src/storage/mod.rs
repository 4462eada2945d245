//! Persistent key-value storage.
//!
//! Every persisted piece of state (result cache, rate limiter, search history,
//! trending keywords) lives under its own key as a JSON document. Writes are
//! write-through: callers update their in-memory state first and then persist
//! the full snapshot, so a failed write is logged and retried implicitly by
//! the next successful mutation.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Storage key for the result cache snapshot.
pub const RESULT_CACHE_KEY: &str = "result_cache";
/// Storage key for the remote call quota.
pub const RATE_LIMITER_KEY: &str = "rate_limiter";
/// Storage key for the search history.
pub const SEARCH_HISTORY_KEY: &str = "search_history";
/// Storage key for the cached trending keywords.
pub const TRENDING_KEYWORDS_KEY: &str = "trending_keywords";

/// Errors for key-value storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Trait for the on-device key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load and decode a JSON document.
///
/// Missing keys, read failures and undecodable documents all yield `None`;
/// the latter two are logged.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read '{}' from storage: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding corrupt '{}' entry: {}", key, e);
            None
        }
    }
}

/// Encode and persist a JSON document.
///
/// Failures are logged and reported as `false`; the caller's in-memory state
/// stays authoritative.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> bool {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to encode '{}' for storage: {}", key, e);
            return false;
        }
    };

    match store.set(key, &raw).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to persist '{}': {}", key, e);
            false
        }
    }
}
