//! Keyword canonicalization and shib-token helpers.

use super::natural_sort::{natural_key, NaturalKey};
use crate::constants::{LIST_DELIMITER, RESERVED_SHIB_KEYWORD, SHIB_PREFIX};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Sort tier: ordinary keywords, then `shib-*`, then the reserved `shib-1234`.
fn tier(token: &str) -> u8 {
    let folded = token.to_lowercase();
    if folded == RESERVED_SHIB_KEYWORD {
        2
    } else if folded.starts_with(SHIB_PREFIX) {
        1
    } else {
        0
    }
}

fn tier_key(token: &str) -> (u8, NaturalKey) {
    match tier(token) {
        2 => (2, NaturalKey::new()),
        t => (t, natural_key(token)),
    }
}

/// Canonicalize a comma-delimited keyword string.
///
/// See [`canonicalize_keyword_list`] for the rules.
pub fn canonicalize_keywords(input: &str) -> String {
    canonicalize_keyword_list([input])
}

/// Canonicalize an explicit keyword list.
///
/// Each item is NFKC-normalized and then split on `,`, since normalization can
/// turn compatibility commas (`，`, `﹐`) into ASCII ones. Tokens are trimmed,
/// empties dropped, duplicates removed case-insensitively (first casing wins),
/// then ordered by tier and natural order within a tier and joined with
/// `", "`. Canonical output is a fixed point: feeding it back in returns it
/// unchanged.
pub fn canonicalize_keyword_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = Vec::new();
    for raw in items {
        let normalized: String = raw.as_ref().nfkc().collect();
        for piece in normalized.split(',') {
            let token = piece.trim();
            if token.is_empty() {
                continue;
            }
            if seen.insert(token.to_lowercase()) {
                unique.push(token.to_string());
            }
        }
    }

    unique.sort_by_cached_key(|token| tier_key(token));
    unique.join(LIST_DELIMITER)
}

/// Derive a `shib-` keyword from a folder name.
///
/// Dotted sequences such as `A.4.3.12` are preserved; whitespace becomes a
/// hyphen and anything outside `[A-Za-z0-9.-]` is dropped.
///
/// # Returns
/// The token, or an empty string when nothing usable remains.
pub fn make_shib_token_from_folder(folder_name: &str) -> String {
    let normalized: String = folder_name.nfkc().collect();
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut slug = String::with_capacity(trimmed.len());
    let mut in_whitespace = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' {
            slug.push(ch);
        }
    }

    let mut collapsed = String::with_capacity(slug.len());
    for ch in slug.chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }

    let core = collapsed.trim_matches(|c| c == '-' || c == '.');
    if core.is_empty() {
        String::new()
    } else {
        format!("{}{}", SHIB_PREFIX, core)
    }
}
