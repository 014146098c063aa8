//! Model-level unit tests.

use super::*;
use std::path::{Path, PathBuf};

#[test]
fn field_parses_case_insensitively_and_rejects_unknown_names() {
    assert_eq!(" Keywords ".parse::<Field>().expect("keywords"), Field::Keywords);
    assert_eq!("TITLE".parse::<Field>().expect("title"), Field::Title);
    let err = "creator".parse::<Field>().expect_err("unknown field");
    assert!(err.to_string().contains("unknown field 'creator'"));
}

#[test]
fn title_from_filename_is_rejected_outside_the_title_field() {
    let mut request = UpdateRequest::new();
    request
        .set(Field::Title, FieldOp::TitleFromFilename, "")
        .expect("title accepts title-from-filename");
    let err = request
        .set(Field::Author, FieldOp::TitleFromFilename, "")
        .expect_err("author must reject title-from-filename");
    assert!(err.to_string().contains("author"));
    assert_eq!(request.len(), 1);
}

#[test]
fn later_edit_for_the_same_field_wins() {
    let request = UpdateRequest::new()
        .with(Field::Subject, FieldOp::Append, "first")
        .and_then(|r| r.with(Field::Subject, FieldOp::Replace, "second"))
        .expect("request");
    let edit = request.get(Field::Subject).expect("subject edit");
    assert_eq!(edit.op, FieldOp::Replace);
    assert_eq!(edit.text, "second");
}

#[test]
fn snapshot_accessors_cover_every_field() {
    let mut snapshot = MetadataSnapshot::new("/docs/2024-0315 {AGM} Notes.pdf");
    for field in Field::ALL {
        snapshot.get_mut(field).push_str(field.as_str());
    }
    for field in Field::ALL {
        assert_eq!(snapshot.get(field), field.as_str());
    }
    assert_eq!(snapshot.filename(), "2024-0315 {AGM} Notes.pdf");
    assert!(snapshot.is_writable());
    snapshot.is_protected = true;
    assert!(!snapshot.is_writable());
}

#[test]
fn failure_uses_file_name_for_display() {
    let failure = Failure::new(Path::new("/a/b/report.pdf"), "File not found");
    assert_eq!(failure.filename, "report.pdf");
    assert_eq!(failure.path, PathBuf::from("/a/b/report.pdf"));

    let unnamed = Failure::new(Path::new(""), "File not found");
    assert_eq!(unnamed.filename, "(unknown)");
}

#[test]
fn batches_get_distinct_ids() {
    let first = Batch::new(Vec::new());
    let second = Batch::new(Vec::new());
    assert_ne!(first.id, second.id);
    assert!(first.is_empty());
}

#[test]
fn outcome_exposes_reports_for_completed_and_cancelled_runs() {
    let completed: BatchOutcome<UndoReport> = BatchOutcome::Completed(UndoReport::default());
    assert!(completed.report().is_some());
    let cancelled: BatchOutcome<UndoReport> = BatchOutcome::Cancelled(UndoReport::default());
    assert!(cancelled.is_cancelled());
    let aborted: BatchOutcome<UndoReport> = BatchOutcome::Aborted {
        message: "ExifTool not found".to_string(),
    };
    assert!(aborted.into_report().is_none());
}
