//! Atomic file replacement with retries for transient lock contention.
//!
//! The replace is a rename of a fully-written sibling file onto the target, so
//! readers observe either the old or the new content. Renames that fail because
//! another process briefly holds the target (antivirus scanners, indexers, a
//! viewer that just closed the file) are retried with exponential backoff and
//! jitter. Anything else fails on the first attempt.

use crate::constants::{
    DEFAULT_REPLACE_ATTEMPTS, DEFAULT_REPLACE_BASE_BACKOFF, MAX_REPLACE_BACKOFF,
};
use rand::Rng;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Retry schedule for [`replace_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_REPLACE_ATTEMPTS,
            base_backoff: DEFAULT_REPLACE_BASE_BACKOFF,
            max_backoff: MAX_REPLACE_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Backoff to sleep after the zero-based failed `attempt`.
    ///
    /// # Returns
    /// `base * 2^attempt` plus up to `base` of random jitter, capped at `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_backoff.as_millis() as u64;
        let exp_ms = base_ms.saturating_mul(1u64 << attempt.min(20));
        let jitter_ms = if base_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=base_ms)
        };
        Duration::from_millis(exp_ms.saturating_add(jitter_ms)).min(self.max_backoff)
    }
}

/// Return `true` when `err` looks like another process briefly holding the file.
///
/// Missing paths, invalid arguments, full disks and similar failures are
/// permanent and must not be retried.
pub fn is_transient_lock(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
    ) {
        return true;
    }
    match err.raw_os_error() {
        // ERROR_ACCESS_DENIED, ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
        #[cfg(windows)]
        Some(5 | 32 | 33) => true,
        // EPERM, EACCES, EBUSY, ETXTBSY
        #[cfg(unix)]
        Some(1 | 13 | 16 | 26) => true,
        _ => false,
    }
}

/// Clear the read-only attribute on `path` if it is set. Best effort.
#[cfg(windows)]
pub fn clear_readonly(path: &Path) {
    let Ok(metadata) = fs::metadata(path) else {
        return;
    };
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        if let Err(err) = fs::set_permissions(path, permissions) {
            tracing::debug!(path = %path.display(), error = %err, "failed to clear read-only bit");
        }
    }
}

/// Renames on unix ignore the mode of the file being replaced.
#[cfg(not(windows))]
pub fn clear_readonly(_path: &Path) {}

/// Replace `dst` with `src` using a same-directory rename.
///
/// # Errors
/// Returns the last observed error once every attempt failed, or the first
/// non-transient error immediately. `dst` is untouched in both cases.
pub fn replace_file(src: &Path, dst: &Path, policy: &RetryPolicy) -> io::Result<()> {
    replace_file_with(src, dst, policy, |from, to| fs::rename(from, to))
}

/// [`replace_file`] with a caller-supplied rename primitive.
///
/// # Errors
/// Same as [`replace_file`].
pub fn replace_file_with<F>(
    src: &Path,
    dst: &Path,
    policy: &RetryPolicy,
    mut rename: F,
) -> io::Result<()>
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    let attempts = policy.attempts.max(1);
    clear_readonly(dst);

    let mut last_err = None;
    for attempt in 0..attempts {
        match rename(src, dst) {
            Ok(()) => {
                if attempt > 0 {
                    tracing::debug!(
                        path = %dst.display(),
                        attempts = attempt + 1,
                        "replace succeeded after retries"
                    );
                }
                return Ok(());
            }
            Err(err) if is_transient_lock(&err) => {
                tracing::debug!(
                    path = %dst.display(),
                    attempt = attempt + 1,
                    error = %err,
                    "replace blocked by transient lock"
                );
                last_err = Some(err);
                if attempt + 1 < attempts {
                    thread::sleep(policy.backoff_for(attempt));
                    clear_readonly(dst);
                }
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("replace failed without an error")))
}

/// Flush `path` and its parent directory to durable storage. Best effort.
pub fn fsync_path(path: &Path) {
    match File::open(path) {
        Ok(file) => {
            if let Err(err) = file.sync_all() {
                tracing::debug!(path = %path.display(), error = %err, "file fsync failed");
            }
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "file open for fsync failed");
        }
    }
    fsync_parent_dir(path);
}

#[cfg(unix)]
fn fsync_parent_dir(path: &Path) {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Ok(dir) = File::open(parent) {
        if let Err(err) = dir.sync_all() {
            tracing::debug!(path = %parent.display(), error = %err, "directory fsync failed");
        }
    }
}

// Directory handles cannot be opened through std on Windows; the replace is
// already write-through there.
#[cfg(not(unix))]
fn fsync_parent_dir(_path: &Path) {}
