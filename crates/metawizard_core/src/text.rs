//! Shared text normalization helpers.

/// Delimiters accepted between author/subject tokens.
pub const MERGE_DELIMITERS: [char; 3] = [',', ';', '|'];

/// Trim a value and drop it when nothing remains.
///
/// # Returns
/// `None` when the input is whitespace-only; otherwise the trimmed slice.
pub fn trimmed_nonempty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Split on any of `, ; |`, trimming tokens and dropping empties.
pub fn split_list_tokens(value: &str) -> Vec<&str> {
    value
        .split(&MERGE_DELIMITERS[..])
        .filter_map(trimmed_nonempty)
        .collect()
}

/// Split a keyword value on commas, trimming tokens and dropping empties.
pub fn split_keyword_tokens(value: &str) -> Vec<&str> {
    value.split(',').filter_map(trimmed_nonempty).collect()
}
