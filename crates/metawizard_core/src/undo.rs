//! Session undo stack and batch replay.

use crate::backend::{MetadataBackend, SecurityCheck};
use crate::error::MetaError;
use crate::models::{
    display_name, Batch, BatchEvent, BatchOutcome, Failure, Field, FieldValues, JournalEntry,
    UndoReport,
};
use crate::worker::CancelToken;
use std::sync::Arc;
use tracing::{info, warn};

/// LIFO stack of reversible write batches. Lives for one session only.
#[derive(Debug, Default)]
pub struct UndoManager {
    stack: Vec<Batch>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a finished batch. Empty batches are ignored.
    ///
    /// # Returns
    /// `true` when the batch was stored.
    pub fn push(&mut self, batch: Batch) -> bool {
        if batch.is_empty() {
            return false;
        }
        info!(batch = %batch.id, files = batch.len(), "undo batch recorded");
        self.stack.push(batch);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Most recent batch without removing it.
    pub fn peek_last(&self) -> Option<&Batch> {
        self.stack.last()
    }

    /// Remove the most recent batch. Once popped it cannot be redone.
    pub fn pop_last(&mut self) -> Option<Batch> {
        self.stack.pop()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Pop the most recent batch and replay it synchronously.
    ///
    /// # Errors
    /// Returns [`MetaError::InvalidOperation`] when there is nothing to undo.
    pub fn undo_last<F>(
        &mut self,
        backend: Arc<dyn MetadataBackend>,
        cancel: &CancelToken,
        emit: F,
    ) -> Result<BatchOutcome<UndoReport>, MetaError>
    where
        F: FnMut(BatchEvent<UndoReport>),
    {
        let batch = self
            .pop_last()
            .ok_or_else(|| MetaError::InvalidOperation("Nothing to undo".to_string()))?;
        Ok(UndoRunner::new(backend).run(&batch, cancel, emit))
    }
}

/// Old values split into fields to rewrite and fields to clear.
///
/// Empty old values cannot be restored through a write, since the write path
/// treats empty input as "leave untouched".
pub fn partition_old_values(old_values: &FieldValues) -> (FieldValues, Vec<Field>) {
    let mut writes = FieldValues::new();
    let mut clears = Vec::new();
    for (field, value) in old_values {
        if value.trim().is_empty() {
            clears.push(*field);
        } else {
            writes.insert(*field, value.clone());
        }
    }
    (writes, clears)
}

/// Replays journal entries of one batch, in their original order.
#[derive(Clone)]
pub struct UndoRunner {
    backend: Arc<dyn MetadataBackend>,
}

impl UndoRunner {
    pub fn new(backend: Arc<dyn MetadataBackend>) -> Self {
        Self { backend }
    }

    /// Restore every entry of `batch`, isolating per-file failures.
    pub fn run<F>(
        &self,
        batch: &Batch,
        cancel: &CancelToken,
        mut emit: F,
    ) -> BatchOutcome<UndoReport>
    where
        F: FnMut(BatchEvent<UndoReport>),
    {
        let total = batch.len();
        let mut report = UndoReport::default();
        report.stats.total = total;
        info!(worker = "undo", batch = %batch.id, files = total, "undo batch started");
        emit(BatchEvent::Status {
            message: format!("Starting undo for {} file(s)...", total),
        });

        for (index, entry) in batch.entries.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(worker = "undo", done = index, total, "undo batch cancelled");
                emit(BatchEvent::Status {
                    message: format!("Undo cancelled after {} of {} files.", index, total),
                });
                return BatchOutcome::Cancelled(report);
            }

            let filename = display_name(&entry.path);
            match self.restore(entry) {
                Ok(()) => report.stats.restored += 1,
                Err(err) => {
                    report.stats.failures += 1;
                    warn!(worker = "undo", file = %filename, error = %err, "restore failed");
                    report.failures.push(Failure::new(&entry.path, err.to_string()));
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

        info!(
            worker = "undo",
            restored = report.stats.restored,
            failures = report.stats.failures,
            "undo batch finished"
        );
        emit(BatchEvent::Status {
            message: format!(
                "Undo complete: {} restored, {} failed.",
                report.stats.restored, report.stats.failures
            ),
        });
        BatchOutcome::Completed(report)
    }

    fn restore(&self, entry: &JournalEntry) -> Result<(), MetaError> {
        if !entry.path.exists() {
            return Err(MetaError::FileNotFound);
        }
        let (writes, clears) = partition_old_values(&entry.old_values);
        if !writes.is_empty() {
            self.backend
                .write_metadata(&entry.path, &writes, SecurityCheck::Probe)?;
        }
        if !clears.is_empty() {
            self.backend
                .clear_metadata_fields(&entry.path, &clears, SecurityCheck::Probe)?;
        }
        Ok(())
    }
}
