//! Background batch threads.
//!
//! Each batch runs on its own named thread and talks to the caller only
//! through a one-way event channel. The caller keeps a [`CancelToken`] to stop
//! the batch at the next file boundary.

use crate::backend::MetadataBackend;
use crate::error::MetaError;
use crate::models::{Batch, BatchEvent, BatchOutcome, UndoReport, UpdateRequest, WriteReport};
use crate::undo::UndoRunner;
use crate::writer::BatchWriter;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::error;

/// Cooperative cancellation flag shared between a batch and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle for receiving events from, and cancelling, a running batch.
pub struct BatchHandle<R> {
    pub events: Receiver<BatchEvent<R>>,
    pub cancel: CancelToken,
    join: JoinHandle<()>,
}

impl<R> BatchHandle<R> {
    /// Request cancellation; takes effect before the next file.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the batch ends, discarding intermediate events.
    ///
    /// # Returns
    /// The terminal outcome, or `None` if the worker died before sending one.
    pub fn wait(self) -> Option<BatchOutcome<R>> {
        let mut outcome = None;
        for event in self.events.iter() {
            if let BatchEvent::Finished(finished) = event {
                outcome = Some(finished);
            }
        }
        if self.join.join().is_err() {
            error!("batch worker panicked");
        }
        outcome
    }
}

/// Produces the backend on the worker thread.
pub type Connector = Box<dyn FnOnce() -> Result<Arc<dyn MetadataBackend>, MetaError> + Send>;

fn spawn_batch<R, F>(
    name: &str,
    kind: &'static str,
    connect: Connector,
    body: F,
) -> Result<BatchHandle<R>, MetaError>
where
    R: Send + 'static,
    F: FnOnce(Arc<dyn MetadataBackend>, &CancelToken, &Sender<BatchEvent<R>>) -> BatchOutcome<R>
        + Send
        + 'static,
{
    let (evt_tx, evt_rx) = unbounded();
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let join = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let outcome = match connect() {
                Ok(backend) => body(backend, &token, &evt_tx),
                Err(err) => {
                    error!(worker = kind, error = %err, "batch aborted before start");
                    BatchOutcome::Aborted {
                        message: err.to_string(),
                    }
                }
            };
            let _ = evt_tx.send(BatchEvent::Finished(outcome));
        })?;

    Ok(BatchHandle {
        events: evt_rx,
        cancel,
        join,
    })
}

/// Run a write batch on a background thread.
///
/// # Errors
/// Returns [`MetaError::Io`] if the thread cannot be spawned. Backend
/// connection failures arrive as [`BatchOutcome::Aborted`].
pub fn spawn_write_batch(
    connect: Connector,
    paths: Vec<PathBuf>,
    request: UpdateRequest,
) -> Result<BatchHandle<WriteReport>, MetaError> {
    spawn_batch("metawizard-writer", "writer", connect, move |backend, token, evt_tx| {
        BatchWriter::new(backend).run(&paths, &request, token, |event| {
            let _ = evt_tx.send(event);
        })
    })
}

/// Restore the pre-write values recorded in `batch` on a background thread.
///
/// The batch must already have been popped from the undo stack.
///
/// # Errors
/// Same as [`spawn_write_batch`].
pub fn spawn_undo_batch(
    connect: Connector,
    batch: Batch,
) -> Result<BatchHandle<UndoReport>, MetaError> {
    spawn_batch("metawizard-undo", "undo", connect, move |backend, token, evt_tx| {
        UndoRunner::new(backend).run(&batch, token, |event| {
            let _ = evt_tx.send(event);
        })
    })
}
