//! Bounded subprocess execution for the ExifTool bridge.

use crate::error::MetaError;
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured output of a finished tool invocation.
#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Trimmed stderr, or `fallback` when the tool printed nothing.
    pub fn error_text(&self, fallback: &str) -> String {
        let trimmed = self.stderr.trim();
        if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

fn tool_command(program: &Path) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buffer);
        }
        buffer
    })
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Run `program` with `args`, killing it once `timeout` elapses.
///
/// Output pipes are drained on helper threads so a chatty tool can never block
/// on a full pipe while we wait for it.
///
/// # Errors
/// - [`MetaError::Io`] when the process cannot be spawned or waited on.
/// - [`MetaError::Timeout`] (labelled with `action`) when the deadline passes.
pub(crate) fn run_tool<I, S>(
    program: &Path,
    args: I,
    timeout: Duration,
    action: &'static str,
) -> Result<ToolOutput, MetaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = tool_command(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill_and_reap(&mut child);
            tracing::warn!(
                program = %program.display(),
                timeout_ms = timeout.as_millis() as u64,
                "exiftool timed out"
            );
            return Err(MetaError::Timeout { action });
        }
        Err(err) => {
            kill_and_reap(&mut child);
            return Err(MetaError::Io(err));
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();
    Ok(ToolOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}
