//! Genre-style query detection.
//!
//! Broad genre queries ("comedy", "horror movies") are answered by the remote
//! catalog only; a local cache of previously seen titles cannot enumerate a
//! genre.

/// Single-token genre and category keywords.
const GENRE_KEYWORDS: &[&str] = &[
    "action",
    "adventure",
    "animation",
    "animated",
    "anime",
    "biography",
    "cartoon",
    "comedy",
    "crime",
    "documentary",
    "drama",
    "family",
    "fantasy",
    "history",
    "horror",
    "kids",
    "music",
    "musical",
    "mystery",
    "noir",
    "romance",
    "romantic",
    "sci-fi",
    "scifi",
    "sport",
    "superhero",
    "thriller",
    "war",
    "western",
];

/// Multi-word genre phrases.
const GENRE_PHRASES: &[&[&str]] = &[
    &["science", "fiction"],
    &["film", "noir"],
    &["true", "crime"],
    &["reality", "tv"],
    &["talk", "show"],
];

/// Words that may accompany a genre without making the query specific.
const FILLER_WORDS: &[&str] = &[
    "movie", "movies", "film", "films", "show", "shows", "series", "tv", "and", "&",
];

fn is_genre_token(token: &str) -> bool {
    if GENRE_KEYWORDS.contains(&token) {
        return true;
    }
    // Naive plural: "comedys" is as good as "comedy", "thrillers" as "thriller"
    token
        .strip_suffix('s')
        .is_some_and(|singular| GENRE_KEYWORDS.contains(&singular))
}

fn phrase_at(tokens: &[&str]) -> Option<usize> {
    GENRE_PHRASES.iter().find_map(|phrase| {
        let matches = phrase.len() <= tokens.len()
            && phrase.iter().zip(tokens).enumerate().all(|(i, (word, token))| {
                // Only the last word may carry a plural "s"
                *word == *token
                    || (i + 1 == phrase.len() && token.strip_suffix('s') == Some(*word))
            });
        matches.then_some(phrase.len())
    })
}

/// Whether `query` is a broad genre query.
///
/// True when every whitespace-separated token is a genre keyword (singular
/// or naively pluralized), part of a genre phrase, or a filler word, and at
/// least one genre token is present.
pub fn is_genre_query(query: &str) -> bool {
    let lowered = query.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let mut saw_genre = false;
    let mut i = 0;
    while i < tokens.len() {
        if let Some(len) = phrase_at(&tokens[i..]) {
            saw_genre = true;
            i += len;
        } else if is_genre_token(tokens[i]) {
            saw_genre = true;
            i += 1;
        } else if FILLER_WORDS.contains(&tokens[i]) {
            i += 1;
        } else {
            return false;
        }
    }

    saw_genre
}
