//! Small string helpers for case-insensitive matching.

/// Unicode-aware case-insensitive substring test. SQLite's `LIKE` only folds ASCII,
/// so fuzzy lookups filter rows here instead.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// First whitespace-separated word of `text`, if any.
pub fn first_word(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// True when `haystack` contains any of `needles`.
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
