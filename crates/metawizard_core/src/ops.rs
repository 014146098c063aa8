//! Ready-made update requests for the common editing actions.

use crate::constants::RESERVED_SHIB_KEYWORD;
use crate::models::{Field, FieldOp, FieldValues, UpdateRequest};
use crate::rules::make_shib_token_from_folder;
use crate::text::trimmed_nonempty;

/// Replace every field that has a non-empty value in `values`.
///
/// Empty inputs are left out entirely; they never clear a field.
pub fn apply_replace(values: &FieldValues) -> UpdateRequest {
    let mut request = UpdateRequest::new();
    for (field, value) in values {
        if let Some(value) = trimmed_nonempty(value) {
            request.insert(*field, FieldOp::Replace, value);
        }
    }
    request
}

pub fn append_field(field: Field, text: &str) -> UpdateRequest {
    let mut request = UpdateRequest::new();
    request.insert(field, FieldOp::Append, text);
    request
}

pub fn clear_field(field: Field) -> UpdateRequest {
    let mut request = UpdateRequest::new();
    request.insert(field, FieldOp::Clear, "");
    request
}

/// Set each file's title to its own base name.
pub fn title_from_filename() -> UpdateRequest {
    let mut request = UpdateRequest::new();
    request.insert(Field::Title, FieldOp::TitleFromFilename, "");
    request
}

/// Append the `shib-` token derived from `folder_name` to the keywords.
///
/// # Returns
/// `None` when the folder name yields no usable token.
pub fn add_folder_shib(folder_name: &str) -> Option<UpdateRequest> {
    let token = make_shib_token_from_folder(folder_name);
    if token.is_empty() {
        return None;
    }
    Some(append_field(Field::Keywords, &token))
}

/// Append the reserved `shib-1234` keyword.
pub fn add_reserved_shib() -> UpdateRequest {
    append_field(Field::Keywords, RESERVED_SHIB_KEYWORD)
}
