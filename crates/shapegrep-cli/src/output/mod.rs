//! Rendering of search results for humans and machines.
//!
//! Matches always go to stdout. Query and file errors go to stderr in
//! separate sections so that piping stdout into another tool stays clean.

mod render;

use std::io::Write;

use clap::ValueEnum;
use shapegrep_core::SearchResults;

use crate::errors::AppError;

/// Output format requested on the command line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Selects `human` for terminal output and `json` for redirected output.
    #[default]
    Auto,
    /// Always render matches with code frames.
    Human,
    /// Always emit the serialised results.
    Json,
}

/// Output format after resolving `auto` against the terminal state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolvedOutputFormat {
    /// Locations with code frames and a summary line.
    Human,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Resolves `auto` based on whether stdout is a terminal.
    #[must_use]
    pub const fn resolve(self, stdout_is_terminal: bool) -> ResolvedOutputFormat {
        match self {
            Self::Auto if stdout_is_terminal => ResolvedOutputFormat::Human,
            Self::Auto | Self::Json => ResolvedOutputFormat::Json,
            Self::Human => ResolvedOutputFormat::Human,
        }
    }
}

/// Writes matches (and, for humans, a summary) to `out`.
pub(crate) fn write_results<W: Write>(
    out: &mut W,
    results: &SearchResults,
    format: ResolvedOutputFormat,
) -> Result<(), AppError> {
    match format {
        ResolvedOutputFormat::Human => {
            render::render_matches(out, &results.matches)?;
            render::render_summary(out, results)?;
        }
        ResolvedOutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results).map_err(AppError::SerialiseResults)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Writes query and file errors to `err`.
pub(crate) fn write_problems<E: Write>(err: &mut E, results: &SearchResults) -> Result<(), AppError> {
    render::render_problems(err, results)?;
    Ok(())
}
