//! Character-safe text helpers.

/// Returns the prefix of `text` holding at most `max` characters.
///
/// Counts Unicode scalar values so multi-byte text is never split mid-character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Like [`truncate_chars`] but appends `...` when anything was cut.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    let prefix = truncate_chars(text, max);
    if prefix.len() < text.len() {
        format!("{}...", prefix)
    } else {
        prefix.to_string()
    }
}
