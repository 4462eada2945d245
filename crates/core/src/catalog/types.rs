//! Types for catalog items and type filtering.

use serde::{Deserialize, Serialize};

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Movie,
    Series,
    /// Episodes, games and anything else the upstream reports.
    #[default]
    #[serde(other)]
    Other,
}

/// A catalog record.
///
/// Identity is `id`; every other field may differ between two fetches of the
/// same item. Field aliases accept the upstream (OMDb) spelling so persisted
/// and remote documents decode the same way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    /// Stable unique identifier (IMDb id, e.g. "tt1375666").
    #[serde(alias = "imdbID")]
    pub id: String,
    /// Display title.
    #[serde(alias = "Title")]
    pub title: String,
    /// Release year or range ("2010", "2008–2013").
    #[serde(default, alias = "Year")]
    pub year: String,
    /// Type tag.
    #[serde(default, rename = "type", alias = "Type")]
    pub item_type: ItemType,
    /// Poster image URL.
    #[serde(default, alias = "Poster")]
    pub poster: String,
    /// Comma-separated genres, when known. Used only for scoring.
    #[serde(default, alias = "Genre", skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl CatalogItem {
    /// Create an item with the given identity and title; other fields empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: String::new(),
            item_type: ItemType::Other,
            poster: String::new(),
            genre: None,
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = poster.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Whether the upstream signalled that no poster exists.
    pub fn has_missing_poster(&self) -> bool {
        let poster = self.poster.trim();
        poster.is_empty() || poster.eq_ignore_ascii_case("N/A")
    }
}

/// Type filter applied to both local and remote lookups.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Movie,
    Series,
}

impl TypeFilter {
    /// Whether an item of `item_type` passes this filter.
    pub fn matches(&self, item_type: ItemType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Movie => item_type == ItemType::Movie,
            TypeFilter::Series => item_type == ItemType::Series,
        }
    }

    /// Value of the upstream `type` query parameter, if any.
    pub fn as_query_param(&self) -> Option<&'static str> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Movie => Some("movie"),
            TypeFilter::Series => Some("series"),
        }
    }
}
