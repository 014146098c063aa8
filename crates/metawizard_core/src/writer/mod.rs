//! Write batch coordinator.
//!
//! Files are processed one at a time. Each file is read, gated on its
//! security state, resolved against the request, written, and journaled.
//! A failure on one file is recorded and the batch moves on.

use crate::backend::{MetadataBackend, SecurityCheck};
use crate::compute::{compute_update, ComputedUpdate};
use crate::error::MetaError;
use crate::models::{
    display_name, BatchEvent, BatchOutcome, Failure, Field, FieldValues, JournalEntry,
    MetadataSnapshot, UpdateRequest, WriteReport,
};
use crate::worker::CancelToken;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-file result of the write state machine.
#[derive(Debug)]
enum FileOutcome {
    Written(JournalEntry),
    Protected,
    Unchanged,
    Failed(String),
}

/// Applies one [`UpdateRequest`] to a list of files.
#[derive(Clone)]
pub struct BatchWriter {
    backend: Arc<dyn MetadataBackend>,
}

impl BatchWriter {
    pub fn new(backend: Arc<dyn MetadataBackend>) -> Self {
        Self { backend }
    }

    /// Run the batch, reporting progress through `emit`.
    ///
    /// `cancel` is checked before every file. A cancelled batch returns the
    /// report for the files processed so far.
    pub fn run<F>(
        &self,
        paths: &[PathBuf],
        request: &UpdateRequest,
        cancel: &CancelToken,
        mut emit: F,
    ) -> BatchOutcome<WriteReport>
    where
        F: FnMut(BatchEvent<WriteReport>),
    {
        let total = paths.len();
        let mut report = WriteReport::default();
        report.stats.total = total;
        info!(
            worker = "writer",
            files = total,
            fields = request.len(),
            "write batch started"
        );

        for (index, path) in paths.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(worker = "writer", done = index, total, "write batch cancelled");
                emit(BatchEvent::Status {
                    message: format!("Write cancelled after {} of {} files.", index, total),
                });
                return BatchOutcome::Cancelled(report);
            }

            let filename = display_name(path);
            match self.process_file(path, request) {
                FileOutcome::Written(entry) => {
                    report.stats.successes += 1;
                    report.journal.push(entry);
                }
                FileOutcome::Protected => {
                    report.stats.skipped += 1;
                    info!(worker = "writer", file = %filename, "skipped protected file");
                    emit(BatchEvent::Status {
                        message: format!("Skipped protected file: {}", filename),
                    });
                }
                FileOutcome::Unchanged => {
                    report.stats.skipped += 1;
                    debug!(worker = "writer", file = %filename, "nothing to change");
                }
                FileOutcome::Failed(error) => {
                    report.stats.failures += 1;
                    warn!(worker = "writer", file = %filename, error = %error, "write failed");
                    report.failures.push(Failure::new(path, error));
                }
            }

            emit(BatchEvent::Progress {
                done: index + 1,
                total,
            });
            emit(BatchEvent::FileProgress {
                done: index + 1,
                total,
                filename,
            });
        }

        let stats = report.stats;
        info!(
            worker = "writer",
            successes = stats.successes,
            skipped = stats.skipped,
            failures = stats.failures,
            "write batch finished"
        );
        emit(BatchEvent::Status {
            message: format!(
                "Write complete: {} succeeded, {} skipped, {} failed.",
                stats.successes, stats.skipped, stats.failures
            ),
        });
        BatchOutcome::Completed(report)
    }

    fn process_file(&self, path: &Path, request: &UpdateRequest) -> FileOutcome {
        if !path.exists() {
            return FileOutcome::Failed(MetaError::FileNotFound.to_string());
        }

        let current = match self.backend.read_metadata(path) {
            Ok(snapshot) => snapshot,
            Err(err) => return FileOutcome::Failed(format!("Read error: {}", err)),
        };
        if current.is_protected {
            return FileOutcome::Protected;
        }
        if current.is_corrupted {
            return FileOutcome::Failed(if current.error_message.is_empty() {
                "Corrupted file".to_string()
            } else {
                current.error_message
            });
        }

        let update = compute_update(path, &current, request);
        if update.is_empty() {
            return FileOutcome::Unchanged;
        }

        match self.apply(path, &update) {
            Ok(()) => FileOutcome::Written(journal_entry(path, &current, &update)),
            Err(error) => FileOutcome::Failed(error),
        }
    }

    /// Write, then clear. A clear failure after a successful write is
    /// reported as such, since the written values stay in the file.
    fn apply(&self, path: &Path, update: &ComputedUpdate) -> Result<(), String> {
        // Security was gated on the snapshot just read.
        if !update.writes.is_empty() {
            self.backend
                .write_metadata(path, &update.writes, SecurityCheck::Skip)
                .map_err(|err| err.to_string())?;
        }
        if !update.clears.is_empty() {
            let fields: Vec<Field> = update.clears.iter().copied().collect();
            if let Err(err) = self
                .backend
                .clear_metadata_fields(path, &fields, SecurityCheck::Skip)
            {
                if update.writes.is_empty() {
                    return Err(err.to_string());
                }
                let written: Vec<&str> =
                    update.writes.keys().map(|field| field.as_str()).collect();
                return Err(format!(
                    "Clear failed after writing {} (written values kept, not undoable): {}",
                    written.join(", "),
                    err
                ));
            }
        }
        Ok(())
    }
}

fn journal_entry(
    path: &Path,
    current: &MetadataSnapshot,
    update: &ComputedUpdate,
) -> JournalEntry {
    let old_values: FieldValues = update
        .touched_fields()
        .map(|field| (field, current.get(field).to_string()))
        .collect();
    let mut new_values = update.writes.clone();
    for field in &update.clears {
        new_values.insert(*field, String::new());
    }
    JournalEntry {
        path: path.to_path_buf(),
        old_values,
        new_values,
    }
}
