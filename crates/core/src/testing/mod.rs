//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external seam (remote
//! catalog, trending source, key-value store, analytics sink), allowing the
//! search and suggestion flows to be exercised without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use cinefind_core::testing::{fixtures, MockRemoteCatalog};
//!
//! let remote = MockRemoteCatalog::new();
//! remote
//!     .set_page("inception", 1, fixtures::remote_page(vec![
//!         fixtures::movie("tt1375666", "Inception", "2010"),
//!     ]))
//!     .await;
//! remote.set_delay("slow", Duration::from_millis(500)).await;
//! ```

mod mock_analytics;
mod mock_remote;
mod mock_store;
mod mock_trending;

pub use mock_analytics::RecordingAnalyticsSink;
pub use mock_remote::MockRemoteCatalog;
pub use mock_store::MockKeyValueStore;
pub use mock_trending::MockTrendingSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{CatalogItem, ItemType};
    use crate::remote::RemoteSearchPage;

    /// A movie with a poster.
    pub fn movie(id: &str, title: &str, year: &str) -> CatalogItem {
        CatalogItem::new(id, title)
            .with_year(year)
            .with_type(ItemType::Movie)
            .with_poster(format!("https://img.example.com/{}.jpg", id))
    }

    /// A series with a poster.
    pub fn series(id: &str, title: &str, year: &str) -> CatalogItem {
        CatalogItem::new(id, title)
            .with_year(year)
            .with_type(ItemType::Series)
            .with_poster(format!("https://img.example.com/{}.jpg", id))
    }

    /// `count` movies titled "`title` N" with ids `{prefix}0000000`, ...
    pub fn numbered_movies(prefix: &str, title: &str, count: usize) -> Vec<CatalogItem> {
        (0..count)
            .map(|i| movie(&format!("{}{:07}", prefix, i), &format!("{} {}", title, i), "2000"))
            .collect()
    }

    /// A remote page whose reported total equals its item count.
    pub fn remote_page(items: Vec<CatalogItem>) -> RemoteSearchPage {
        RemoteSearchPage {
            total_results: items.len() as u32,
            items,
        }
    }

    /// A remote page with an explicit reported total.
    pub fn remote_page_with_total(items: Vec<CatalogItem>, total_results: u32) -> RemoteSearchPage {
        RemoteSearchPage {
            items,
            total_results,
        }
    }
}
