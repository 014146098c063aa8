//! Field identifiers, per-field operations and update requests.

use crate::error::MetaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the four descriptive metadata fields the engine edits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Author,
    Subject,
    Keywords,
}

/// Resolved field values keyed by field, in stable field order.
pub type FieldValues = BTreeMap<Field, String>;

impl Field {
    /// Every field, in display order.
    pub const ALL: [Field; 4] = [Field::Title, Field::Author, Field::Subject, Field::Keywords];

    /// Lowercase logical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Subject => "subject",
            Field::Keywords => "keywords",
        }
    }

    /// ExifTool tag name used when writing or clearing the field.
    pub fn tag(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Author => "Author",
            Field::Subject => "Subject",
            Field::Keywords => "Keywords",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = MetaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| MetaError::InvalidOperation(format!("unknown field '{}'", value)))
    }
}

/// Operation requested for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOp {
    /// Write the trimmed text; empty text is a no-op.
    Replace,
    /// Merge the text into the current value; empty text is a no-op.
    Append,
    /// Remove the field's value.
    Clear,
    /// Set the title to the file's own base name (title only).
    TitleFromFilename,
}

impl FieldOp {
    /// Whether the operation reads the supplied text.
    pub fn uses_text(self) -> bool {
        matches!(self, FieldOp::Replace | FieldOp::Append)
    }
}

/// Operation plus raw user text for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdit {
    pub op: FieldOp,
    /// Raw input; ignored for [`FieldOp::Clear`] and [`FieldOp::TitleFromFilename`].
    pub text: String,
}

/// Requested edits for a batch, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    edits: BTreeMap<Field, FieldEdit>,
}

impl UpdateRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the edit for `field`, replacing any earlier edit for that field.
    ///
    /// # Errors
    /// Returns [`MetaError::InvalidOperation`] when `op` is
    /// [`FieldOp::TitleFromFilename`] on a field other than the title.
    pub fn set(
        &mut self,
        field: Field,
        op: FieldOp,
        text: impl Into<String>,
    ) -> Result<&mut Self, MetaError> {
        if op == FieldOp::TitleFromFilename && field != Field::Title {
            return Err(MetaError::InvalidOperation(format!(
                "title-from-filename cannot target the {} field",
                field
            )));
        }
        self.edits.insert(
            field,
            FieldEdit {
                op,
                text: text.into(),
            },
        );
        Ok(self)
    }

    /// Builder form of [`UpdateRequest::set`].
    ///
    /// # Errors
    /// Same as [`UpdateRequest::set`].
    pub fn with(
        mut self,
        field: Field,
        op: FieldOp,
        text: impl Into<String>,
    ) -> Result<Self, MetaError> {
        self.set(field, op, text)?;
        Ok(self)
    }

    /// Insert an edit already known to be valid for `field`.
    pub(crate) fn insert(&mut self, field: Field, op: FieldOp, text: impl Into<String>) {
        debug_assert!(op != FieldOp::TitleFromFilename || field == Field::Title);
        self.edits.insert(
            field,
            FieldEdit {
                op,
                text: text.into(),
            },
        );
    }

    pub fn get(&self, field: Field) -> Option<&FieldEdit> {
        self.edits.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldEdit)> {
        self.edits.iter().map(|(field, edit)| (*field, edit))
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }
}
