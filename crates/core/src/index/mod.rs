//! Approximate-match index over cached catalog items.
//!
//! The index is derived from a [`ResultCache`](crate::catalog::ResultCache)
//! snapshot and is never updated incrementally. Cache writes only flip it to
//! [`IndexState::Stale`]; the next reader rebuilds it in full, so a burst of
//! writes costs exactly one rebuild.

mod genre;
mod matcher;

pub use genre::is_genre_query;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use matcher::{field_score, prepare, MIN_FIELD_SCORE};

/// Build state of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    /// Never built.
    Absent,
    /// Built, but the cache changed since.
    Stale,
    /// Reflects the current cache.
    Current,
}

/// Field weights and match threshold.
///
/// Weights are relative; they are normalized to sum to 1 when scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyOptions {
    /// Maximum per-field score (0.0 exact .. 1.0 anything) that counts as a match.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,
    #[serde(default = "default_year_weight")]
    pub year_weight: f64,
    #[serde(default = "default_genre_weight")]
    pub genre_weight: f64,
}

fn default_threshold() -> f64 {
    0.4
}

fn default_title_weight() -> f64 {
    0.7
}

fn default_year_weight() -> f64 {
    0.2
}

fn default_genre_weight() -> f64 {
    0.1
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            title_weight: default_title_weight(),
            year_weight: default_year_weight(),
            genre_weight: default_genre_weight(),
        }
    }
}

impl FuzzyOptions {
    /// Looser, title-dominant tuning used for suggestions.
    pub fn suggestions() -> Self {
        Self {
            threshold: 0.5,
            title_weight: 0.9,
            year_weight: 0.1,
            genre_weight: 0.0,
        }
    }

    fn normalized_weights(&self) -> [f64; 3] {
        let weights = [
            self.title_weight.max(0.0),
            self.year_weight.max(0.0),
            self.genre_weight.max(0.0),
        ];
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return [1.0, 0.0, 0.0];
        }
        weights.map(|w| w / total)
    }
}

/// A scored search hit. Lower scores are better.
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    pub item: Arc<CatalogItem>,
    pub score: f64,
}

struct IndexedItem {
    item: Arc<CatalogItem>,
    /// Lowercased title, year, genre.
    fields: [Vec<char>; 3],
}

/// Weighted multi-field approximate-match index.
pub struct FuzzyIndex {
    entries: Vec<IndexedItem>,
    state: IndexState,
}

impl Default for FuzzyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyIndex {
    /// Create an absent (never built) index.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            state: IndexState::Absent,
        }
    }

    /// Rebuild from a cache snapshot.
    pub fn build(&mut self, items: &[Arc<CatalogItem>]) {
        self.entries = items
            .iter()
            .map(|item| IndexedItem {
                fields: [
                    prepare(&item.title),
                    prepare(&item.year),
                    prepare(item.genre.as_deref().unwrap_or_default()),
                ],
                item: Arc::clone(item),
            })
            .collect();
        self.state = IndexState::Current;
    }

    /// Record that the underlying cache changed.
    pub fn mark_stale(&mut self) {
        self.state = IndexState::Stale;
    }

    pub fn is_stale(&self) -> bool {
        self.state == IndexState::Stale
    }

    /// Whether a rebuild is required before the next query.
    pub fn needs_rebuild(&self) -> bool {
        self.state != IndexState::Current
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search the index.
    ///
    /// A field matches when its normalized edit score is within
    /// `options.threshold`; items without any matching field are dropped. The
    /// item score is the product of `score^weight` over matching fields.
    /// Results are sorted ascending by score, ties keeping cache order, and
    /// truncated to `limit` when given.
    pub fn search(&self, query: &str, limit: Option<usize>, options: &FuzzyOptions) -> Vec<FuzzyMatch> {
        let pattern = prepare(query.trim());
        if pattern.is_empty() {
            return Vec::new();
        }

        let weights = options.normalized_weights();
        let mut matches: Vec<FuzzyMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let mut matched = false;
                let mut total = 1.0;
                for (field, weight) in entry.fields.iter().zip(weights) {
                    if weight <= 0.0 {
                        continue;
                    }
                    let score = field_score(&pattern, field);
                    if score <= options.threshold {
                        matched = true;
                        total *= score.max(MIN_FIELD_SCORE).powf(weight);
                    }
                }
                matched.then(|| FuzzyMatch {
                    item: Arc::clone(&entry.item),
                    score: total,
                })
            })
            .collect();

        matches.sort_by(|a, b| a.score.total_cmp(&b.score));
        if let Some(limit) = limit {
            matches.truncate(limit);
        }
        matches
    }
}
