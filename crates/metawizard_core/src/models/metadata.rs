//! Current-metadata snapshot for a single document.

use super::field::Field;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Metadata read from one file, plus its security state.
///
/// A snapshot is never partially populated: fields that could not be found
/// are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    pub path: PathBuf,
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    pub is_protected: bool,
    pub is_corrupted: bool,
    pub error_message: String,
}

impl MetadataSnapshot {
    /// Create an empty snapshot for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Current value of `field`.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Subject => &self.subject,
            Field::Keywords => &self.keywords,
        }
    }

    /// Mutable access used when assembling a snapshot from tool output.
    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Author => &mut self.author,
            Field::Subject => &mut self.subject,
            Field::Keywords => &mut self.keywords,
        }
    }

    /// File name component of the path, for display.
    pub fn filename(&self) -> String {
        display_name(&self.path)
    }

    /// Whether the file may be written at all.
    pub fn is_writable(&self) -> bool {
        !self.is_protected && !self.is_corrupted
    }
}

/// File name component of `path`, or `(unknown)` when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string())
}
