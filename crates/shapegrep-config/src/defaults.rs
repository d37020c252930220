use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Files above this many bytes are skipped with an error by default.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default per-file parse budget in milliseconds.
pub const DEFAULT_FILE_TIMEOUT_MS: u64 = 2_000;

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default size guard in bytes.
#[must_use]
pub const fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

/// Default per-file parse timeout in milliseconds.
#[must_use]
pub const fn default_file_timeout_ms() -> u64 {
    DEFAULT_FILE_TIMEOUT_MS
}

/// Default worker count; zero means one worker per available core.
#[must_use]
pub const fn default_threads() -> usize {
    0
}
