//! Small text helpers shared across the engine.

/// Last `max_chars` characters of a string, sliced at a char boundary.
pub fn trailing_chars(text: &str, max_chars: usize) -> &str {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        return text;
    }
    let skip = char_count - max_chars;
    let byte_idx = text
        .char_indices()
        .nth(skip)
        .map_or(text.len(), |(i, _)| i);
    &text[byte_idx..]
}

/// Approximate word count by whitespace splitting (token-budget proxy).
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
