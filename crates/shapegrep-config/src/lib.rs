//! Layered configuration for shapegrep.
//!
//! Values are resolved from built-in defaults, then a TOML configuration
//! file, then `SHAPEGREP_*` environment variables, then command-line flags,
//! with later layers taking precedence. The file is located through
//! `--config-path`, `SHAPEGREP_CONFIG_PATH` or the usual dotfile discovery
//! performed by `ortho_config`.
//!
//! The configuration only carries operational settings (logging, resource
//! guards, parallelism). Queries, paths and match modes are search arguments
//! owned by the command line.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_FILE_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_MAX_FILE_SIZE, default_file_timeout_ms,
    default_log_filter, default_log_filter_string, default_log_format, default_max_file_size,
    default_threads,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Flags consumed by the configuration loader rather than the search.
///
/// These must precede search arguments on the command line.
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--max-file-size",
    "--file-timeout-ms",
    "--threads",
];

/// Resolved shapegrep configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHAPEGREP")]
pub struct Config {
    /// Tracing filter expression, e.g. `warn` or `shapegrep_core=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Files larger than this many bytes are skipped; `0` disables the guard.
    #[serde(default = "default_max_file_size")]
    #[ortho_config(default = default_max_file_size())]
    pub max_file_size: u64,
    /// Per-file parse budget in milliseconds; `0` disables the limit.
    #[serde(default = "default_file_timeout_ms")]
    #[ortho_config(default = default_file_timeout_ms())]
    pub file_timeout_ms: u64,
    /// Worker threads; `0` uses one per available core.
    #[serde(default = "default_threads")]
    #[ortho_config(default = default_threads())]
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_file_size: default_max_file_size(),
            file_timeout_ms: default_file_timeout_ms(),
            threads: default_threads(),
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Size guard in bytes, or `None` when disabled.
    #[must_use]
    pub const fn max_file_size(&self) -> Option<u64> {
        match self.max_file_size {
            0 => None,
            limit => Some(limit),
        }
    }

    /// Per-file parse timeout, or `None` when disabled.
    #[must_use]
    pub const fn file_timeout(&self) -> Option<Duration> {
        match self.file_timeout_ms {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// Worker thread count; `0` means one per available core.
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }
}
