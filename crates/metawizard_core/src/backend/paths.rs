//! Path handling for the ExifTool bridge: tool discovery and long-path support.

use crate::constants::{BUNDLED_TOOLS_DIR, EXIFTOOL_BINARY};
use crate::error::MetaError;
use std::env;
use std::path::{Path, PathBuf};

fn executable_names(name: &str) -> Vec<String> {
    let mut names = vec![name.to_string()];
    if cfg!(windows) && Path::new(name).extension().is_none() {
        names.push(format!("{}.exe", name));
    }
    names
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| {
            executable_names(name)
                .into_iter()
                .map(move |candidate| dir.join(candidate))
        })
        .find(|probe| probe.is_file())
}

fn bundled_exiftool() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let tools = exe.parent()?.join(BUNDLED_TOOLS_DIR);
    executable_names(EXIFTOOL_BINARY)
        .into_iter()
        .map(|name| tools.join(name))
        .find(|candidate| candidate.is_file())
}

/// Locate the ExifTool executable.
///
/// Order: `explicit` path, a bundled `tools/exiftool` next to the running
/// executable, then `exiftool` on `PATH`. A bare name is looked up on `PATH`.
///
/// # Errors
/// Returns [`MetaError::ToolNotFound`] when nothing usable exists.
pub fn resolve_exiftool_path(explicit: Option<&Path>) -> Result<PathBuf, MetaError> {
    let candidate = match explicit {
        Some(path) => path.to_path_buf(),
        None => match bundled_exiftool() {
            Some(bundled) => return Ok(bundled),
            None => PathBuf::from(EXIFTOOL_BINARY),
        },
    };

    if candidate.is_file() {
        return Ok(candidate);
    }
    let is_bare_name = candidate.components().count() == 1;
    if is_bare_name {
        if let Some(found) = find_on_path(&candidate.to_string_lossy()) {
            return Ok(found);
        }
    }
    Err(MetaError::ToolNotFound(candidate.display().to_string()))
}

/// Absolute form of `path`, using the extended-length prefix on Windows when
/// the path is long enough to hit `MAX_PATH`.
pub fn safe_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    win_long_path(absolute)
}

#[cfg(windows)]
fn win_long_path(path: PathBuf) -> PathBuf {
    const LONG_PATH_THRESHOLD: usize = 240;
    let text = path.to_string_lossy();
    if text.starts_with(r"\\?\") || text.len() < LONG_PATH_THRESHOLD {
        return path;
    }
    if let Some(unc) = text.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"\\?\UNC\{}", unc));
    }
    PathBuf::from(format!(r"\\?\{}", text))
}

#[cfg(not(windows))]
fn win_long_path(path: PathBuf) -> PathBuf {
    path
}
