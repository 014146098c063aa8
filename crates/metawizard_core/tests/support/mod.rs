//! Shared integration-test helpers: an in-memory metadata backend and temp docs.

#![allow(dead_code)]

use metawizard_core::{Field, FieldValues, MetaError, MetadataBackend, MetadataSnapshot, SecurityCheck};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Metadata kept in memory, keyed by path. Paths must exist on disk.
#[derive(Debug, Default)]
pub(crate) struct MemoryBackend {
    docs: Mutex<HashMap<PathBuf, MetadataSnapshot>>,
    rejected: Mutex<HashSet<PathBuf>>,
}

impl MemoryBackend {
    pub(crate) fn seed(&self, path: &Path, values: [&str; 4]) {
        let [title, author, subject, keywords] = values;
        let snapshot = MetadataSnapshot {
            title: title.to_string(),
            author: author.to_string(),
            subject: subject.to_string(),
            keywords: keywords.to_string(),
            ..MetadataSnapshot::new(path)
        };
        self.docs
            .lock()
            .expect("docs")
            .insert(path.to_path_buf(), snapshot);
    }

    /// Make every write and clear on `path` fail.
    pub(crate) fn reject(&self, path: &Path) {
        self.rejected
            .lock()
            .expect("rejected")
            .insert(path.to_path_buf());
    }

    pub(crate) fn get(&self, path: &Path) -> MetadataSnapshot {
        self.docs
            .lock()
            .expect("docs")
            .get(path)
            .cloned()
            .unwrap_or_else(|| MetadataSnapshot::new(path))
    }

    fn guard(&self, path: &Path) -> Result<(), MetaError> {
        if !path.exists() {
            return Err(MetaError::FileNotFound);
        }
        if self.rejected.lock().expect("rejected").contains(path) {
            return Err(MetaError::Tool("Error: write refused".to_string()));
        }
        Ok(())
    }
}

impl MetadataBackend for MemoryBackend {
    fn read_metadata(&self, path: &Path) -> Result<MetadataSnapshot, MetaError> {
        Ok(self.get(path))
    }

    fn write_metadata(
        &self,
        path: &Path,
        fields: &FieldValues,
        _check: SecurityCheck,
    ) -> Result<(), MetaError> {
        self.guard(path)?;
        let mut docs = self.docs.lock().expect("docs");
        let doc = docs
            .entry(path.to_path_buf())
            .or_insert_with(|| MetadataSnapshot::new(path));
        for (field, value) in fields {
            if !value.trim().is_empty() {
                *doc.get_mut(*field) = value.trim().to_string();
            }
        }
        Ok(())
    }

    fn clear_metadata_fields(
        &self,
        path: &Path,
        fields: &[Field],
        _check: SecurityCheck,
    ) -> Result<(), MetaError> {
        self.guard(path)?;
        let mut docs = self.docs.lock().expect("docs");
        let doc = docs
            .entry(path.to_path_buf())
            .or_insert_with(|| MetadataSnapshot::new(path));
        for field in fields {
            doc.get_mut(*field).clear();
        }
        Ok(())
    }
}

/// Create empty placeholder documents in a fresh temp dir.
pub(crate) fn temp_docs(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("temp dir");
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").expect("write doc");
            path
        })
        .collect();
    (dir, paths)
}
