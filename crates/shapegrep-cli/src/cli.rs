//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;
use shapegrep_core::Mode;

use crate::output::OutputFormat;

/// Structural code search with wildcard query snippets.
///
/// Configuration flags (`--config-path`, `--log-filter`, `--log-format`,
/// `--max-file-size`, `--file-timeout-ms`, `--threads`) are read before
/// these arguments and must come first on the command line.
#[derive(Parser, Debug)]
#[command(name = "shapegrep", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Matching mode: `exact`, `include`, `include-with-order` or `text`.
    #[arg(long, default_value_t = Mode::Include)]
    pub(crate) mode: Mode,
    /// Folds letter case when comparing identifiers and strings.
    #[arg(short = 'i', long = "case-insensitive")]
    pub(crate) case_insensitive: bool,
    /// Controls how results are rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
    pub(crate) output: OutputFormat,
    /// A query snippet; repeat to search for several at once.
    #[arg(short = 'q', long = "query", value_name = "QUERY")]
    pub(crate) queries: Vec<String>,
    /// Reads one query snippet from a file; may be repeated.
    #[arg(long = "query-file", value_name = "FILE")]
    pub(crate) query_files: Vec<PathBuf>,
    /// Files or directories to search. Defaults to the current directory.
    #[arg(value_name = "PATH")]
    pub(crate) paths: Vec<PathBuf>,
}

impl Cli {
    /// Returns the search roots, falling back to `.`.
    pub(crate) fn search_roots(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}
