//! Shared test-only helpers for metawizard_core.

use crate::backend::{MetadataBackend, SecurityCheck};
use crate::error::MetaError;
use crate::models::{Field, FieldValues, MetadataSnapshot};
use crate::text::trimmed_nonempty;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Which backend call a failure is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FakeCall {
    Read,
    Write,
    Clear,
}

#[derive(Debug, Default)]
struct FakeState {
    docs: HashMap<PathBuf, MetadataSnapshot>,
    failures: HashSet<(PathBuf, FakeCall)>,
    writes: usize,
    clears: usize,
}

/// In-memory [`MetadataBackend`]. Metadata lives in a map keyed by path, but
/// the path itself must exist on disk, mirroring the real bridge.
#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, snapshot: MetadataSnapshot) {
        let mut state = self.state.lock().expect("fake state");
        state.docs.insert(snapshot.path.clone(), snapshot);
    }

    pub(crate) fn fail(&self, path: &Path, call: FakeCall) {
        let mut state = self.state.lock().expect("fake state");
        state.failures.insert((path.to_path_buf(), call));
    }

    pub(crate) fn snapshot(&self, path: &Path) -> MetadataSnapshot {
        let state = self.state.lock().expect("fake state");
        state
            .docs
            .get(path)
            .cloned()
            .unwrap_or_else(|| MetadataSnapshot::new(path))
    }

    /// Number of successful write and clear calls.
    pub(crate) fn mutation_counts(&self) -> (usize, usize) {
        let state = self.state.lock().expect("fake state");
        (state.writes, state.clears)
    }

    fn check(
        state: &FakeState,
        path: &Path,
        call: FakeCall,
        security: SecurityCheck,
    ) -> Result<(), MetaError> {
        if !path.exists() {
            return Err(MetaError::FileNotFound);
        }
        if state.failures.contains(&(path.to_path_buf(), call)) {
            return Err(MetaError::Tool(format!("injected {:?} failure", call)));
        }
        if security == SecurityCheck::Probe {
            if let Some(doc) = state.docs.get(path) {
                if doc.is_protected {
                    return Err(MetaError::Protected);
                }
                if doc.is_corrupted {
                    return Err(MetaError::Corrupted(doc.error_message.clone()));
                }
            }
        }
        Ok(())
    }
}

impl MetadataBackend for FakeBackend {
    fn read_metadata(&self, path: &Path) -> Result<MetadataSnapshot, MetaError> {
        let state = self.state.lock().expect("fake state");
        if !path.exists() {
            let mut snapshot = MetadataSnapshot::new(path);
            snapshot.is_corrupted = true;
            snapshot.error_message = MetaError::FileNotFound.to_string();
            return Ok(snapshot);
        }
        if state.failures.contains(&(path.to_path_buf(), FakeCall::Read)) {
            return Err(MetaError::Tool("injected read failure".to_string()));
        }
        Ok(state
            .docs
            .get(path)
            .cloned()
            .unwrap_or_else(|| MetadataSnapshot::new(path)))
    }

    fn write_metadata(
        &self,
        path: &Path,
        fields: &FieldValues,
        check: SecurityCheck,
    ) -> Result<(), MetaError> {
        let mut state = self.state.lock().expect("fake state");
        Self::check(&state, path, FakeCall::Write, check)?;
        let doc = state
            .docs
            .entry(path.to_path_buf())
            .or_insert_with(|| MetadataSnapshot::new(path));
        for (field, value) in fields {
            if let Some(value) = trimmed_nonempty(value) {
                *doc.get_mut(*field) = value.to_string();
            }
        }
        state.writes += 1;
        Ok(())
    }

    fn clear_metadata_fields(
        &self,
        path: &Path,
        fields: &[Field],
        check: SecurityCheck,
    ) -> Result<(), MetaError> {
        let mut state = self.state.lock().expect("fake state");
        Self::check(&state, path, FakeCall::Clear, check)?;
        let doc = state
            .docs
            .entry(path.to_path_buf())
            .or_insert_with(|| MetadataSnapshot::new(path));
        for field in fields {
            doc.get_mut(*field).clear();
        }
        state.clears += 1;
        Ok(())
    }
}

/// Create `names` as empty files in a fresh temp dir.
///
/// Keep the [`TempDir`] alive for the whole test.
///
/// # Panics
/// Panics if the temp dir or any file cannot be created.
pub(crate) fn temp_docs(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("temp dir");
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"%PDF-1.4\n").expect("write doc");
            path
        })
        .collect();
    (dir, paths)
}

/// Snapshot with the given title/author/subject/keywords.
pub(crate) fn doc(path: &Path, values: [&str; 4]) -> MetadataSnapshot {
    let [title, author, subject, keywords] = values;
    MetadataSnapshot {
        title: title.to_string(),
        author: author.to_string(),
        subject: subject.to_string(),
        keywords: keywords.to_string(),
        ..MetadataSnapshot::new(path)
    }
}
