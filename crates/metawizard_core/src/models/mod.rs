//! Data models shared by the compute, write and undo paths.

/// Journal entries, undo batches and per-run reports.
pub mod batch;
/// Field identifiers, operations and update requests.
pub mod field;
/// Snapshot of a document's current metadata.
pub mod metadata;

pub use batch::{
    Batch, BatchEvent, BatchOutcome, BatchStats, Failure, JournalEntry, UndoReport, UndoStats, WriteReport,
};
pub use field::{Field, FieldEdit, FieldOp, FieldValues, UpdateRequest};
pub use metadata::{display_name, MetadataSnapshot};

#[cfg(test)]
mod tests;
