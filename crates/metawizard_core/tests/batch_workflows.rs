//! End-to-end write and undo batches driven through the background workers.

mod support;

use crossbeam_channel::Receiver;
use metawizard_core::ops;
use metawizard_core::{
    spawn_undo_batch, spawn_write_batch, BatchEvent, BatchOutcome, Config, Connector, ExifTool,
    Field, FieldOp, MetadataBackend, UndoManager, UpdateRequest, WriteReport,
};
use std::sync::Arc;
use std::time::Duration;
use support::{temp_docs, MemoryBackend};

fn connector(backend: &Arc<MemoryBackend>) -> Connector {
    let backend = backend.clone();
    Box::new(move || Ok(backend as Arc<dyn MetadataBackend>))
}

/// Collect events until the terminal one, returning status lines and outcome.
fn drain<R>(rx: &Receiver<BatchEvent<R>>) -> (Vec<String>, BatchOutcome<R>) {
    let mut statuses = Vec::new();
    loop {
        match rx
            .recv_timeout(Duration::from_secs(5))
            .expect("expected batch event")
        {
            BatchEvent::Status { message } => statuses.push(message),
            BatchEvent::Finished(outcome) => return (statuses, outcome),
            BatchEvent::Progress { .. } | BatchEvent::FileProgress { .. } => {}
        }
    }
}

fn completed<R>(outcome: BatchOutcome<R>) -> R {
    match outcome {
        BatchOutcome::Completed(report) => report,
        BatchOutcome::Cancelled(_) => panic!("batch was cancelled"),
        BatchOutcome::Aborted { message } => panic!("batch aborted: {}", message),
    }
}

#[test]
fn write_then_undo_is_identity_on_touched_fields() {
    let (_dir, paths) = temp_docs(&["2024-0315 {AGM} Notes.pdf", "2023-0000 [HSP] Plan.pdf"]);
    let backend = Arc::new(MemoryBackend::default());
    backend.seed(&paths[0], ["Old title", "Smith", "Budget", "b, a"]);
    backend.seed(&paths[1], ["", "", "", ""]);
    let before: Vec<_> = paths.iter().map(|path| backend.get(path)).collect();

    let request = UpdateRequest::new()
        .with(Field::Title, FieldOp::TitleFromFilename, "")
        .and_then(|r| r.with(Field::Author, FieldOp::Append, "Doe; smith"))
        .and_then(|r| r.with(Field::Subject, FieldOp::Clear, ""))
        .and_then(|r| r.with(Field::Keywords, FieldOp::Append, "shib-1234, WHO"))
        .expect("request");

    let handle = spawn_write_batch(connector(&backend), paths.clone(), request).expect("spawn");
    let (statuses, outcome) = drain(&handle.events);
    let report: WriteReport = completed(outcome);
    assert_eq!(report.stats.successes, 2);
    assert_eq!(
        statuses.last().map(String::as_str),
        Some("Write complete: 2 succeeded, 0 skipped, 0 failed.")
    );

    let written = backend.get(&paths[0]);
    assert_eq!(written.title, "2024-0315 {AGM} Notes");
    assert_eq!(written.author, "Smith, Doe");
    assert_eq!(written.subject, "");
    assert_eq!(written.keywords, "a, b, WHO, shib-1234");
    assert_eq!(backend.get(&paths[1]).keywords, "WHO, shib-1234");

    let mut undo = UndoManager::new();
    assert!(undo.push(report.into_batch()));
    let batch = undo.pop_last().expect("batch to undo");
    let handle = spawn_undo_batch(connector(&backend), batch).expect("spawn undo");
    let (statuses, outcome) = drain(&handle.events);
    let undo_report = completed(outcome);
    assert_eq!(undo_report.stats.restored, 2);
    assert_eq!(
        statuses.last().map(String::as_str),
        Some("Undo complete: 2 restored, 0 failed.")
    );

    for (path, original) in paths.iter().zip(before) {
        assert_eq!(backend.get(path), original);
    }
    assert!(!undo.can_undo());
}

#[test]
fn failures_stay_isolated_and_out_of_the_journal() {
    let (_dir, paths) = temp_docs(&["a.pdf", "b.pdf", "c.pdf"]);
    let backend = Arc::new(MemoryBackend::default());
    backend.reject(&paths[1]);

    let request = ops::add_reserved_shib();
    let handle = spawn_write_batch(connector(&backend), paths.clone(), request).expect("spawn");
    let report = completed(handle.wait().expect("outcome"));

    assert_eq!(report.stats.successes, 2);
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.failures[0].filename, "b.pdf");
    assert!(report.failures[0].error.contains("write refused"));
    assert_eq!(report.journal.len(), 2);
    assert_eq!(backend.get(&paths[2]).keywords, "shib-1234");
}

#[test]
fn appending_empty_text_changes_nothing() {
    let (_dir, paths) = temp_docs(&["a.pdf"]);
    let backend = Arc::new(MemoryBackend::default());
    backend.seed(&paths[0], ["T", "A", "S", "k"]);
    let before = backend.get(&paths[0]);

    for field in Field::ALL {
        let handle = spawn_write_batch(
            connector(&backend),
            paths.clone(),
            ops::append_field(field, "  "),
        )
        .expect("spawn");
        let report = completed(handle.wait().expect("outcome"));
        assert_eq!(report.stats.skipped, 1);
        assert!(report.journal.is_empty());
        assert!(report.into_batch().is_empty());
    }
    assert_eq!(backend.get(&paths[0]), before);
}

#[test]
fn missing_exiftool_aborts_the_batch() {
    let (dir, paths) = temp_docs(&["a.pdf"]);
    let config = Config {
        exiftool_path: Some(dir.path().join("no-such-exiftool")),
        ..Config::default()
    };

    let handle =
        spawn_write_batch(ExifTool::connector(config), paths, ops::title_from_filename())
            .expect("spawn");
    let (_, outcome) = drain(&handle.events);
    match outcome {
        BatchOutcome::Aborted { message } => {
            assert!(message.contains("no-such-exiftool"), "{}", message);
            assert!(message.contains("or in PATH"), "{}", message);
        }
        _ => panic!("expected aborted outcome"),
    }
}
