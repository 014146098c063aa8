//! Journal, undo batch and per-run report types.

use super::field::FieldValues;
use super::metadata::display_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Reversible record of one successfully written file.
///
/// `old_values` holds the pre-write value of exactly the fields that were
/// written or cleared; `new_values` holds what was written (empty string for
/// cleared fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub path: PathBuf,
    pub old_values: FieldValues,
    pub new_values: FieldValues,
}

/// One reversible write batch, as stored on the undo stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<JournalEntry>,
}

impl Batch {
    /// Wrap journal entries into a new batch with a fresh id.
    pub fn new(entries: Vec<JournalEntry>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub filename: String,
    pub path: PathBuf,
    pub error: String,
}

impl Failure {
    pub fn new(path: &Path, error: impl Into<String>) -> Self {
        Self {
            filename: display_name(path),
            path: path.to_path_buf(),
            error: error.into(),
        }
    }
}

/// Per-run write summary. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub successes: usize,
    pub skipped: usize,
    pub failures: usize,
}

/// Result of a write batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteReport {
    pub stats: BatchStats,
    pub failures: Vec<Failure>,
    pub journal: Vec<JournalEntry>,
}

impl WriteReport {
    /// Convert the journal into an undo batch.
    pub fn into_batch(self) -> Batch {
        Batch::new(self.journal)
    }
}

/// Per-run undo summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoStats {
    pub total: usize,
    pub restored: usize,
    pub failures: usize,
}

/// Result of an undo batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UndoReport {
    pub stats: UndoStats,
    pub failures: Vec<Failure>,
}

/// Terminal value of a background batch.
#[derive(Debug, Clone)]
pub enum BatchOutcome<R> {
    /// Every file was visited.
    Completed(R),
    /// Cancellation was observed at a file boundary; the report covers the
    /// files processed before that point.
    Cancelled(R),
    /// A fatal precondition failed before any file was processed.
    Aborted { message: String },
}

impl<R> BatchOutcome<R> {
    /// The report, if the batch got far enough to produce one.
    pub fn report(&self) -> Option<&R> {
        match self {
            BatchOutcome::Completed(report) | BatchOutcome::Cancelled(report) => Some(report),
            BatchOutcome::Aborted { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<R> {
        match self {
            BatchOutcome::Completed(report) | BatchOutcome::Cancelled(report) => Some(report),
            BatchOutcome::Aborted { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BatchOutcome::Cancelled(_))
    }
}

/// Message emitted by a running batch. The terminal `Finished` event is sent
/// exactly once, by the worker thread.
#[derive(Debug, Clone)]
pub enum BatchEvent<R> {
    /// `done` of `total` files have been processed.
    Progress { done: usize, total: usize },
    /// Finished the file at position `done` (1-based), whatever its outcome.
    FileProgress {
        done: usize,
        total: usize,
        filename: String,
    },
    /// Human-readable status line.
    Status { message: String },
    Finished(BatchOutcome<R>),
}
