//! Error types for metadata reads, writes and batch processing.
use std::io;
use thiserror::Error;

/// Top-level error type for the metadata engine.
#[derive(Error, Debug)]
pub enum MetaError {
    #[error("ExifTool not found at '{0}' or in PATH.")]
    ToolNotFound(String),

    #[error("File not found")]
    FileNotFound,

    #[error("ExifTool error: {0}")]
    Tool(String),

    #[error("Timeout {action}")]
    Timeout { action: &'static str },

    #[error("Invalid metadata format: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    #[error("The file appears to be open or locked. Close the file and retry.")]
    Locked(#[source] io::Error),

    #[error("Error replacing file: {0}")]
    Replace(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot modify password-protected file")]
    Protected,

    #[error("Cannot modify corrupted file: {0}")]
    Corrupted(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl MetaError {
    /// Classify a failed replace, separating lock contention from other I/O failures.
    ///
    /// # Returns
    /// [`MetaError::Locked`] for permission/lock errors, otherwise [`MetaError::Replace`].
    pub fn from_replace(err: io::Error) -> Self {
        if crate::fs_atomic::is_transient_lock(&err) {
            Self::Locked(err)
        } else {
            Self::Replace(err)
        }
    }
}
