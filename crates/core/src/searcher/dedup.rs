//! Merging of local and remote result lists by item id.

use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::CatalogItem;

/// Combine remote and local results for one page.
///
/// Remote items come first and win both placement and fields; local items
/// follow unless an item with the same id was already taken.
pub fn merge_page(
    remote: Vec<Arc<CatalogItem>>,
    local: Vec<Arc<CatalogItem>>,
) -> Vec<Arc<CatalogItem>> {
    let mut seen: HashSet<String> = HashSet::new();
    remote
        .into_iter()
        .chain(local)
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// Append `incoming` to `existing`, skipping ids already shown.
pub fn append_unique(
    existing: &[Arc<CatalogItem>],
    incoming: Vec<Arc<CatalogItem>>,
) -> Vec<Arc<CatalogItem>> {
    let mut seen: HashSet<String> = existing.iter().map(|item| item.id.clone()).collect();
    let mut merged = existing.to_vec();
    merged.extend(incoming.into_iter().filter(|item| seen.insert(item.id.clone())));
    merged
}
