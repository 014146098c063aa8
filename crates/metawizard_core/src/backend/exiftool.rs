//! ExifTool-backed metadata bridge.
//!
//! Reads probe for encryption or corruption first, then extract a fixed tag
//! set as JSON. Writes never touch the original directly: the file is copied to a
//! sibling temp file, ExifTool edits the copy in place, the copy is flushed and
//! then atomically renamed over the original.

use super::paths::{resolve_exiftool_path, safe_path};
use super::process::run_tool;
use super::{MetadataBackend, SecurityCheck};
use crate::config::Config;
use crate::constants::{DOCUMENT_EXTENSION, LIST_DELIMITER};
use crate::error::MetaError;
use crate::fs_atomic::{fsync_path, replace_file, RetryPolicy};
use crate::models::{Field, FieldValues, MetadataSnapshot};
use crate::text::{split_keyword_tokens, trimmed_nonempty};
use crate::worker::Connector;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Source tags per field, highest precedence first.
const TAG_PRECEDENCE: [(Field, [&str; 3]); 4] = [
    (Field::Title, ["PDF:Title", "XMP-dc:Title", "Title"]),
    (Field::Author, ["PDF:Author", "XMP-pdf:Author", "Author"]),
    (Field::Subject, ["PDF:Subject", "XMP-dc:Subject", "Subject"]),
    (Field::Keywords, ["PDF:Keywords", "XMP-pdf:Keywords", "Keywords"]),
];

const READ_ARGS: [&str; 10] = [
    "-json",
    "-G1",
    "-PDF:Title",
    "-XMP-dc:Title",
    "-PDF:Author",
    "-XMP-pdf:Author",
    "-PDF:Subject",
    "-XMP-dc:Subject",
    "-PDF:Keywords",
    "-XMP-pdf:Keywords",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum SecurityState {
    Clear,
    Protected,
    Corrupted(String),
}

/// [`MetadataBackend`] that shells out to the `exiftool` binary.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
    probe_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    replace_policy: RetryPolicy,
}

impl ExifTool {
    /// Resolve and validate the ExifTool executable.
    ///
    /// # Errors
    /// Returns [`MetaError::ToolNotFound`] when no executable can be located.
    pub fn new(config: &Config) -> Result<Self, MetaError> {
        let program = resolve_exiftool_path(config.exiftool_path.as_deref())?;
        tracing::info!(path = %program.display(), "using exiftool");
        Ok(Self {
            program,
            probe_timeout: config.probe_timeout,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
            replace_policy: config.replace_policy,
        })
    }

    /// Connector for the batch workers: resolves the tool on the worker
    /// thread so a missing executable aborts the batch before any file.
    pub fn connector(config: Config) -> Connector {
        Box::new(move || Ok(Arc::new(ExifTool::new(&config)?) as Arc<dyn MetadataBackend>))
    }

    /// Resolved executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn check_security(&self, path: &Path) -> SecurityState {
        let target = safe_path(path);
        let encrypted = run_tool(
            &self.program,
            probe_args(&["-s", "-s", "-s", "-Encrypted"], &target),
            self.probe_timeout,
            "checking file",
        );
        match encrypted {
            Ok(out) if !out.success() => {
                return SecurityState::Corrupted(format!(
                    "ExifTool error: {}",
                    out.error_text("unknown error")
                ))
            }
            Ok(out) if out.stdout.trim().eq_ignore_ascii_case("yes") => {
                return SecurityState::Protected
            }
            Ok(_) => {}
            Err(err) => return SecurityState::Corrupted(probe_error_message(err)),
        }

        match run_tool(
            &self.program,
            probe_args(&["-json", "-fast"], &target),
            self.probe_timeout,
            "checking file",
        ) {
            Ok(out) if !out.success() => SecurityState::Corrupted(format!(
                "ExifTool error: {}",
                out.error_text("unknown error")
            )),
            Ok(_) => SecurityState::Clear,
            Err(err) => SecurityState::Corrupted(probe_error_message(err)),
        }
    }

    fn ensure_writable(&self, path: &Path, check: SecurityCheck) -> Result<(), MetaError> {
        if check == SecurityCheck::Skip {
            return Ok(());
        }
        match self.check_security(path) {
            SecurityState::Clear => Ok(()),
            SecurityState::Protected => Err(MetaError::Protected),
            SecurityState::Corrupted(detail) => Err(MetaError::Corrupted(detail)),
        }
    }

    /// Copy `path` to a sibling temp file, let ExifTool edit the copy, then
    /// swap it over the original. The temp file is removed on every failure.
    fn edit_via_temp(
        &self,
        path: &Path,
        mut args: Vec<OsString>,
        action: &'static str,
    ) -> Result<(), MetaError> {
        let folder = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| DOCUMENT_EXTENSION.to_string());
        let staged = tempfile::Builder::new()
            .prefix(".metawizard-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(folder)?
            .into_temp_path();

        fs::copy(path, &staged)?;

        args.push(OsString::from("--"));
        args.push(safe_path(&staged).into_os_string());
        let out = run_tool(&self.program, args, self.write_timeout, action)?;
        if !out.success() {
            return Err(MetaError::Tool(out.error_text("unknown")));
        }

        fsync_path(&staged);
        replace_file(&staged, path, &self.replace_policy).map_err(MetaError::from_replace)?;
        // The staged path now names the original; nothing left to clean up.
        if let Err(err) = staged.keep() {
            tracing::debug!(error = %err, "staged file already moved");
        }
        fsync_path(path);
        Ok(())
    }
}

fn probe_args(flags: &[&str], target: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = flags.iter().map(OsString::from).collect();
    args.push(OsString::from("--"));
    args.push(target.as_os_str().to_owned());
    args
}

fn probe_error_message(err: MetaError) -> String {
    match err {
        MetaError::Timeout { .. } => "Timeout checking file".to_string(),
        other => format!("Error checking file: {}", other),
    }
}

/// Render one JSON tag value as text.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => items
            .iter()
            .map(as_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(LIST_DELIMITER),
        Value::Null | Value::Object(_) => String::new(),
    }
}

fn pick_text(tags: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| tags.get(*key))
        .map(as_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Parse `exiftool -json` output into the tag map of the first file.
fn parse_tag_json(stdout: &str) -> Result<Map<String, Value>, MetaError> {
    let raw = if stdout.trim().is_empty() { "[]" } else { stdout };
    let mut records: Vec<Map<String, Value>> = serde_json::from_str(raw)?;
    Ok(if records.is_empty() {
        Map::new()
    } else {
        records.swap_remove(0)
    })
}

fn apply_tags(snapshot: &mut MetadataSnapshot, tags: &Map<String, Value>) {
    for (field, keys) in TAG_PRECEDENCE {
        *snapshot.get_mut(field) = pick_text(tags, &keys);
    }

    let pdf_subject = pick_text(tags, &["PDF:Subject"]);
    let xmp_subject = pick_text(tags, &["XMP-dc:Subject"]);
    if !pdf_subject.is_empty() && !xmp_subject.is_empty() && pdf_subject != xmp_subject {
        tracing::info!(
            path = %snapshot.path.display(),
            pdf = %pdf_subject,
            xmp = %xmp_subject,
            "subject mismatch between PDF and XMP; using PDF:Subject"
        );
    }
}

/// ExifTool assignments for a write. Keywords become one assignment per token
/// so readers see a list rather than one comma-bearing value.
fn write_args(fields: &FieldValues) -> Vec<OsString> {
    let mut args = Vec::new();
    for (field, value) in fields {
        let Some(value) = trimmed_nonempty(value) else {
            continue;
        };
        if *field == Field::Keywords {
            for token in split_keyword_tokens(value) {
                args.push(OsString::from(format!("-{}={}", field.tag(), token)));
            }
        } else {
            args.push(OsString::from(format!("-{}={}", field.tag(), value)));
        }
    }
    args
}

fn clear_args(fields: &[Field]) -> Vec<OsString> {
    fields
        .iter()
        .copied()
        .collect::<BTreeSet<Field>>()
        .into_iter()
        .map(|field| OsString::from(format!("-{}=", field.tag())))
        .collect()
}

impl MetadataBackend for ExifTool {
    fn read_metadata(&self, path: &Path) -> Result<MetadataSnapshot, MetaError> {
        let mut snapshot = MetadataSnapshot::new(path);
        if !path.exists() {
            snapshot.is_corrupted = true;
            snapshot.error_message = MetaError::FileNotFound.to_string();
            return Ok(snapshot);
        }

        match self.check_security(path) {
            SecurityState::Clear => {}
            SecurityState::Protected => {
                snapshot.is_protected = true;
                snapshot.error_message = "Password protected".to_string();
                return Ok(snapshot);
            }
            SecurityState::Corrupted(detail) => {
                snapshot.is_corrupted = true;
                snapshot.error_message = detail;
                return Ok(snapshot);
            }
        }

        let mut args: Vec<OsString> = READ_ARGS.iter().map(OsString::from).collect();
        args.push(OsString::from("--"));
        args.push(safe_path(path).into_os_string());
        let out = run_tool(&self.program, args, self.read_timeout, "reading metadata")?;
        if !out.success() {
            return Err(MetaError::Tool(out.error_text("unknown")));
        }

        let tags = parse_tag_json(&out.stdout)?;
        apply_tags(&mut snapshot, &tags);
        Ok(snapshot)
    }

    fn write_metadata(
        &self,
        path: &Path,
        fields: &FieldValues,
        check: SecurityCheck,
    ) -> Result<(), MetaError> {
        if !path.exists() {
            return Err(MetaError::FileNotFound);
        }
        self.ensure_writable(path, check)?;

        let assignments = write_args(fields);
        if assignments.is_empty() {
            return Ok(());
        }
        tracing::debug!(path = %path.display(), assignments = assignments.len(), "writing metadata");
        let mut args = vec![OsString::from("-overwrite_original")];
        args.extend(assignments);
        self.edit_via_temp(path, args, "writing metadata")
    }

    fn clear_metadata_fields(
        &self,
        path: &Path,
        fields: &[Field],
        check: SecurityCheck,
    ) -> Result<(), MetaError> {
        if !path.exists() {
            return Err(MetaError::FileNotFound);
        }
        self.ensure_writable(path, check)?;

        let assignments = clear_args(fields);
        if assignments.is_empty() {
            return Ok(());
        }
        tracing::debug!(path = %path.display(), fields = assignments.len(), "clearing metadata");
        let mut args = vec![OsString::from("-overwrite_original")];
        args.extend(assignments);
        self.edit_via_temp(path, args, "clearing metadata")
    }
}
