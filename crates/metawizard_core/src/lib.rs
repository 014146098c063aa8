//! Core library for MetaWizard: batch editing of document title, author,
//! subject and keywords with journaled undo.

/// External metadata collaborator (ExifTool bridge).
pub mod backend;
/// Per-file resolution of requested edits.
pub mod compute;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Application error types.
pub mod error;
/// Crash-safe file replacement with lock retry.
pub mod fs_atomic;
/// Data models for requests, snapshots, journals and reports.
pub mod models;
/// Request builders for common editing actions.
pub mod ops;
/// Keyword, natural-sort and filename rules.
pub mod rules;
/// Text splitting helpers.
pub mod text;
/// Session undo stack.
pub mod undo;
/// Background batch threads and cancellation.
pub mod worker;
/// Write batch coordinator.
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{ExifTool, MetadataBackend, SecurityCheck};
pub use config::Config;
pub use error::MetaError;
pub use models::{
    Batch, BatchEvent, BatchOutcome, Field, FieldOp, FieldValues, MetadataSnapshot,
    UpdateRequest, UndoReport, WriteReport,
};
pub use undo::{UndoManager, UndoRunner};
pub use worker::{spawn_undo_batch, spawn_write_batch, BatchHandle, CancelToken, Connector};
pub use writer::BatchWriter;
