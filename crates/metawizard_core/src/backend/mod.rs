//! Boundary to the external metadata reader/writer.
//!
//! The engine never parses documents itself. Everything it knows about a
//! file's metadata comes through a [`MetadataBackend`], and every change goes
//! back through one. The production implementation is [`ExifTool`], which
//! shells out to the `exiftool` binary.

mod exiftool;
mod paths;
mod process;

pub use exiftool::ExifTool;
pub use paths::{resolve_exiftool_path, safe_path};

use crate::error::MetaError;
use crate::models::{Field, FieldValues, MetadataSnapshot};
use std::path::Path;

/// Whether a write re-verifies the file's security state first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityCheck {
    /// Probe for encryption/corruption and refuse unsafe files.
    Probe,
    /// Caller already gated this file on a fresh snapshot.
    Skip,
}

/// Reads and writes a document's descriptive metadata.
pub trait MetadataBackend: Send + Sync {
    /// Read the current metadata and security state of `path`.
    ///
    /// Protection and corruption are reported through the snapshot flags, not
    /// as errors.
    ///
    /// # Errors
    /// Returns an error when the metadata itself could not be extracted.
    fn read_metadata(&self, path: &Path) -> Result<MetadataSnapshot, MetaError>;

    /// Write non-empty `fields` to `path`, replacing the file atomically.
    ///
    /// Empty values are ignored; clearing goes through
    /// [`MetadataBackend::clear_metadata_fields`].
    ///
    /// # Errors
    /// Returns an error when the file is missing, refused by the security
    /// check, or the tool/replace step fails. The original is untouched then.
    fn write_metadata(
        &self,
        path: &Path,
        fields: &FieldValues,
        check: SecurityCheck,
    ) -> Result<(), MetaError>;

    /// Assign an empty value to each of `fields` on `path`.
    ///
    /// # Errors
    /// Same as [`MetadataBackend::write_metadata`].
    fn clear_metadata_fields(
        &self,
        path: &Path,
        fields: &[Field],
        check: SecurityCheck,
    ) -> Result<(), MetaError>;
}
