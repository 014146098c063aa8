//! Natural ordering: ASCII digit runs compare by magnitude, text case-insensitively.

use std::cmp::Ordering;

/// One run of a tokenized string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortToken {
    /// ASCII digit run. Sorts before text at the same position.
    Number(Digits),
    /// Non-digit run, lowercased.
    Text(String),
}

/// Digit run compared by numeric value without overflow.
///
/// Leading zeros are dropped, so `"007"` and `"7"` are equal keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digits(String);

impl Digits {
    fn new(run: &str) -> Self {
        let trimmed = run.trim_start_matches('0');
        Self(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Comparable natural-sort key.
pub type NaturalKey = Vec<SortToken>;

/// Split `text` into alternating ASCII-digit and non-digit runs.
///
/// Every character lands in exactly one run. Non-ASCII numerals are text.
pub fn tokenize(text: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current_is_digit = None;

    for (idx, ch) in text.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match current_is_digit {
            Some(prev) if prev != is_digit => {
                runs.push((prev, &text[start..idx]));
                start = idx;
                current_is_digit = Some(is_digit);
            }
            None => current_is_digit = Some(is_digit),
            _ => {}
        }
    }
    if let Some(is_digit) = current_is_digit {
        runs.push((is_digit, &text[start..]));
    }
    runs
}

/// Build the natural-sort key for `text`.
pub fn natural_key(text: &str) -> NaturalKey {
    tokenize(text)
        .into_iter()
        .map(|(is_digit, run)| {
            if is_digit {
                SortToken::Number(Digits::new(run))
            } else {
                SortToken::Text(run.to_lowercase())
            }
        })
        .collect()
}

/// Compare two strings in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

/// Stable natural sort; equal keys keep their input order.
pub fn natural_sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by_cached_key(|item| natural_key(item.as_ref()));
}
