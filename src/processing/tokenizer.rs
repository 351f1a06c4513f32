//! Tokenization and small text helpers

use std::collections::HashSet;

/// Split text into lowercase ASCII-letter runs of at least two characters.
///
/// Every non-letter character (digits, punctuation, whitespace, non-ASCII)
/// is a separator and is dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|run| run.len() >= 2)
        .map(|run| run.to_ascii_lowercase())
        .collect()
}

/// Distinct tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// First `max_chars` characters of `text`, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate for display, appending an ellipsis when anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}
