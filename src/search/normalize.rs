//! Text normalization shared by the vocabulary, the query parser and field indexing.
//!
//! Every string comparison in the engine goes through [`normalize`], so the same
//! rules must apply when building indices and when parsing queries.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalizes text for comparison.
///
/// Lowercases, decomposes (NFD) and drops combining marks so `"Baños"` becomes
/// `"banos"`, replaces every character that is neither a word character
/// (alphanumeric or `_`) nor whitespace with a space, then collapses whitespace.
///
/// Never fails; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    // Lowercase before decomposing: some lowercase mappings emit combining marks.
    let lowered: String = text.chars().flat_map(char::to_lowercase).collect();

    let mut cleaned = String::with_capacity(lowered.len());
    for ch in lowered.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_alphanumeric() || ch == '_' {
            cleaned.push(ch);
        } else {
            cleaned.push(' ');
        }
    }

    collapse_whitespace(&cleaned)
}

/// Normalizes an optional field, treating `None` as empty.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Collapses whitespace runs to single spaces and trims both ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
