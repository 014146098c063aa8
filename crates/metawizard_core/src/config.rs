//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_PROBE_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT, ENV_EXIFTOOL,
    ENV_PROBE_TIMEOUT_SECS, ENV_READ_TIMEOUT_SECS, ENV_REPLACE_ATTEMPTS, ENV_REPLACE_BACKOFF_MS,
    ENV_WRITE_TIMEOUT_SECS, MAX_REPLACE_ATTEMPTS,
};
use crate::fs_atomic::RetryPolicy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the metadata engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit ExifTool location; `None` means bundled copy or `PATH` lookup.
    pub exiftool_path: Option<PathBuf>,
    pub probe_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub replace_policy: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exiftool_path: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            replace_policy: RetryPolicy::default(),
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}

fn parse_secs(value: Option<String>) -> Option<Duration> {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing or unparseable values fall back to defaults.
    ///
    /// # Arguments
    /// - `lookup`: Returns the raw value for an environment-style key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let attempts = lookup(ENV_REPLACE_ATTEMPTS)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .map(|n| n.clamp(1, MAX_REPLACE_ATTEMPTS))
            .unwrap_or(defaults.replace_policy.attempts);
        let base_backoff = lookup(ENV_REPLACE_BACKOFF_MS)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.replace_policy.base_backoff);

        Self {
            exiftool_path: lookup(ENV_EXIFTOOL)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .map(expand_tilde)
                .map(PathBuf::from),
            probe_timeout: parse_secs(lookup(ENV_PROBE_TIMEOUT_SECS))
                .unwrap_or(defaults.probe_timeout),
            read_timeout: parse_secs(lookup(ENV_READ_TIMEOUT_SECS))
                .unwrap_or(defaults.read_timeout),
            write_timeout: parse_secs(lookup(ENV_WRITE_TIMEOUT_SECS))
                .unwrap_or(defaults.write_timeout),
            replace_policy: RetryPolicy {
                attempts,
                base_backoff,
                max_backoff: defaults.replace_policy.max_backoff,
            },
        }
    }
}
