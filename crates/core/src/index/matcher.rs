//! Approximate substring scoring.

/// Smallest score a matching field contributes, so exact matches still
/// order by weight instead of collapsing to zero.
pub(crate) const MIN_FIELD_SCORE: f64 = 1e-3;

/// Minimum number of edits turning `pattern` into any substring of `text`.
///
/// Sellers' variant of Levenshtein: the match may start anywhere in `text`
/// at no cost, so the position of the match does not influence the result.
pub(crate) fn substring_edit_distance(pattern: &[char], text: &[char]) -> usize {
    if pattern.is_empty() {
        return 0;
    }
    if text.is_empty() {
        return pattern.len();
    }

    // prev[j]: edits to match pattern[..i] ending at text[..j]
    let mut prev = vec![0usize; text.len() + 1];
    let mut curr = vec![0usize; text.len() + 1];

    for (i, p) in pattern.iter().enumerate() {
        curr[0] = i + 1;
        for (j, t) in text.iter().enumerate() {
            let cost = if p == t { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev.iter().copied().min().unwrap_or(pattern.len())
}

/// Normalized mismatch between a lowercased pattern and field, in `[0, 1]`.
///
/// 0.0 means the pattern occurs verbatim somewhere in the field; 1.0 means no
/// character lines up.
pub(crate) fn field_score(pattern: &[char], field: &[char]) -> f64 {
    if pattern.is_empty() {
        return 0.0;
    }
    if field.is_empty() {
        return 1.0;
    }
    let distance = substring_edit_distance(pattern, field);
    (distance as f64 / pattern.len() as f64).min(1.0)
}

/// Lowercase and collect into chars for repeated scoring.
pub(crate) fn prepare(text: &str) -> Vec<char> {
    text.to_lowercase().chars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(pattern: &str, text: &str) -> usize {
        substring_edit_distance(&prepare(pattern), &prepare(text))
    }

    #[test]
    fn test_exact_substring_is_free() {
        assert_eq!(distance("knight", "The Dark Knight Rises"), 0);
        assert_eq!(distance("the dark", "The Dark Knight"), 0);
    }

    #[test]
    fn test_single_typo() {
        assert_eq!(distance("incepton", "Inception"), 1);
        assert_eq!(distance("batmn", "Batman Begins"), 1);
    }

    #[test]
    fn test_transposition_costs_two() {
        assert_eq!(distance("mitrax", "The Matrix"), 2);
    }

    #[test]
    fn test_location_independent() {
        assert_eq!(
            distance("rings", "Rings of Power"),
            distance("rings", "The Lord of the Rings")
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(distance("", "anything"), 0);
        assert_eq!(distance("abc", ""), 3);
    }

    #[test]
    fn test_field_score_range() {
        assert_eq!(field_score(&prepare("inception"), &prepare("Inception")), 0.0);
        assert_eq!(field_score(&prepare("xyz"), &prepare("")), 1.0);

        let score = field_score(&prepare("incepton"), &prepare("Inception"));
        assert!(score > 0.0 && score < 0.2);

        let score = field_score(&prepare("zzzz"), &prepare("Inception"));
        assert_eq!(score, 1.0);
    }
}
