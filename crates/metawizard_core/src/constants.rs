//! Shared constants used across the metadata engine.

use std::time::Duration;

/// Extension of the documents handled by the engine (without the dot).
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Reserved keyword that always sorts last.
pub const RESERVED_SHIB_KEYWORD: &str = "shib-1234";
/// Prefix shared by all shib-tier keywords.
pub const SHIB_PREFIX: &str = "shib-";

/// Delimiter used when joining keyword and merged token lists.
pub const LIST_DELIMITER: &str = ", ";

/// Default timeout for the encryption/corruption probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default timeout for a metadata read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);
/// Default timeout for a metadata write or clear.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of rename attempts while a destination is locked.
pub const DEFAULT_REPLACE_ATTEMPTS: u32 = 12;
/// Upper bound accepted for configured rename attempts.
pub const MAX_REPLACE_ATTEMPTS: u32 = 32;
/// Base backoff between rename attempts; doubles per attempt.
pub const DEFAULT_REPLACE_BASE_BACKOFF: Duration = Duration::from_millis(60);
/// Cap applied to a single backoff sleep.
pub const MAX_REPLACE_BACKOFF: Duration = Duration::from_secs(1);

/// Default executable name looked up on `PATH`.
pub const EXIFTOOL_BINARY: &str = "exiftool";
/// Directory next to the running executable that may hold a bundled ExifTool.
pub const BUNDLED_TOOLS_DIR: &str = "tools";

/// Environment variable names read by [`crate::Config::from_env`].
pub const ENV_EXIFTOOL: &str = "METAWIZARD_EXIFTOOL";
/// Probe timeout override, in seconds.
pub const ENV_PROBE_TIMEOUT_SECS: &str = "METAWIZARD_PROBE_TIMEOUT_SECS";
/// Read timeout override, in seconds.
pub const ENV_READ_TIMEOUT_SECS: &str = "METAWIZARD_READ_TIMEOUT_SECS";
/// Write timeout override, in seconds.
pub const ENV_WRITE_TIMEOUT_SECS: &str = "METAWIZARD_WRITE_TIMEOUT_SECS";
/// Rename attempt count override.
pub const ENV_REPLACE_ATTEMPTS: &str = "METAWIZARD_REPLACE_ATTEMPTS";
/// Base rename backoff override, in milliseconds.
pub const ENV_REPLACE_BACKOFF_MS: &str = "METAWIZARD_REPLACE_BACKOFF_MS";
