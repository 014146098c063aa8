//! Per-file resolution of requested field edits into concrete writes and clears.
//!
//! Empty input never means "clear": replace/append with whitespace-only text is
//! a silent no-op for that field, and clearing is only ever explicit.

use crate::constants::LIST_DELIMITER;
use crate::models::{Field, FieldOp, FieldValues, MetadataSnapshot, UpdateRequest};
use crate::rules::canonicalize_keywords;
use crate::text::{split_list_tokens, trimmed_nonempty};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Values to write and fields to clear for one file.
///
/// A field appears in at most one of `writes` and `clears`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedUpdate {
    pub writes: FieldValues,
    pub clears: BTreeSet<Field>,
}

impl ComputedUpdate {
    /// Nothing to write and nothing to clear.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.clears.is_empty()
    }

    /// Fields touched by this update, writes first.
    pub fn touched_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.writes.keys().copied().chain(self.clears.iter().copied())
    }
}

/// File base name without its extension.
pub fn filename_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.trim().is_empty())
}

/// Merge author/subject tokens.
///
/// Current tokens are kept in order; new tokens are appended unless they match
/// a token already present, compared case-insensitively.
pub fn merge_list_tokens(current: &str, addition: &str) -> String {
    let mut merged: Vec<&str> = split_list_tokens(current);
    let mut seen: HashSet<String> = merged.iter().map(|token| token.to_lowercase()).collect();
    for token in split_list_tokens(addition) {
        if seen.insert(token.to_lowercase()) {
            merged.push(token);
        }
    }
    merged.join(LIST_DELIMITER)
}

fn append_keywords(current: &str, addition: &str) -> String {
    let current = current.trim();
    if current.is_empty() {
        canonicalize_keywords(addition)
    } else {
        canonicalize_keywords(&format!("{}{}{}", current, LIST_DELIMITER, addition))
    }
}

fn resolve_text_edit(field: Field, op: FieldOp, text: &str, current: &str) -> Option<String> {
    let text = trimmed_nonempty(text)?;
    let value = match (field, op) {
        (Field::Keywords, FieldOp::Append) => append_keywords(current, text),
        (Field::Keywords, _) => canonicalize_keywords(text),
        (Field::Author | Field::Subject, FieldOp::Append) => merge_list_tokens(current, text),
        // Title append is a replace.
        _ => text.to_string(),
    };
    trimmed_nonempty(&value).map(str::to_string)
}

/// Resolve `request` against the current metadata of the file at `path`.
///
/// # Returns
/// The writes and clears for this file; empty when every edit was a no-op.
pub fn compute_update(
    path: &Path,
    current: &MetadataSnapshot,
    request: &UpdateRequest,
) -> ComputedUpdate {
    let mut update = ComputedUpdate::default();
    for (field, edit) in request.iter() {
        match edit.op {
            FieldOp::Clear => {
                update.clears.insert(field);
            }
            FieldOp::TitleFromFilename => {
                if field == Field::Title {
                    if let Some(stem) = filename_stem(path) {
                        update.writes.insert(field, stem);
                    }
                }
            }
            FieldOp::Replace | FieldOp::Append => {
                if let Some(value) = resolve_text_edit(field, edit.op, &edit.text, current.get(field))
                {
                    update.writes.insert(field, value);
                }
            }
        }
    }
    update
}
