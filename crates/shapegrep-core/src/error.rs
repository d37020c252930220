//! Error types for query preparation, file processing and matching.
//!
//! Failures are isolated per query and per file: [`SearchError`] is the
//! internal propagation type, while [`MatchError`] and [`QueryError`] are the
//! owned records collected into search results so callers can tell "your
//! pattern is invalid" apart from "this file in your codebase is broken".

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Reasons a grammar adapter could not produce a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseFailure {
    /// The source is not syntactically valid for the grammar.
    #[error("syntax error at {line}:{column} near `{context}`")]
    Syntax {
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Snippet of the offending source.
        context: String,
    },

    /// Parsing exceeded the configured per-file time limit.
    #[error("parsing exceeded the {}ms time limit", limit.as_millis())]
    TimedOut {
        /// The limit that was exceeded.
        limit: Duration,
    },

    /// The parser could not be set up for the grammar.
    #[error("parser unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl ParseFailure {
    /// Creates a syntax failure.
    #[must_use]
    pub fn syntax(line: u32, column: u32, context: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            context: context.into(),
        }
    }

    /// Creates an unavailable-parser failure.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Errors raised while preparing queries or processing files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SearchError {
    /// A query string is not valid syntax for a grammar.
    #[error("query {index} is not valid {grammar}: {source}")]
    QueryParse {
        /// Position of the query in the caller's list.
        index: usize,
        /// Name of the grammar that rejected it.
        grammar: String,
        /// Underlying parse failure.
        #[source]
        source: ParseFailure,
    },

    /// A query contained no statements or no literal text.
    #[error("query {index} is empty")]
    EmptyQuery {
        /// Position of the query in the caller's list.
        index: usize,
    },

    /// A source file could not be parsed.
    #[error("failed to parse file: {0}")]
    FileParse(#[source] ParseFailure),

    /// The comparator produced inconsistent key lists. Signals a bug.
    #[error("structural invariant violated: {message}")]
    StructuralInvariant {
        /// Description of the inconsistency.
        message: String,
    },

    /// A file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// A file exceeds the configured size guard.
    #[error("file is {size} bytes, above the {limit} byte limit")]
    FileTooLarge {
        /// Size of the file in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// No grammar is registered for the file.
    #[error("no grammar available for this file type")]
    UnsupportedLanguage,
}

impl SearchError {
    /// Creates a structural invariant error.
    #[must_use]
    pub fn structural_invariant(message: impl Into<String>) -> Self {
        Self::StructuralInvariant {
            message: message.into(),
        }
    }

    /// Returns the [`ErrorKind`] used when this error is recorded.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::QueryParse { .. } | Self::EmptyQuery { .. } => ErrorKind::QueryParse,
            Self::FileParse(_) => ErrorKind::FileParse,
            Self::StructuralInvariant { .. } => ErrorKind::StructuralInvariant,
            Self::Io(_) => ErrorKind::Io,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::UnsupportedLanguage => ErrorKind::UnsupportedLanguage,
        }
    }
}

/// Coarse classification of a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A query failed to parse.
    QueryParse,
    /// A file failed to parse.
    FileParse,
    /// An internal consistency check failed.
    StructuralInvariant,
    /// A file could not be read.
    Io,
    /// A file was above the size guard.
    FileTooLarge,
    /// A file had no grammar.
    UnsupportedLanguage,
}

/// A per-file failure collected during a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchError {
    /// The file that failed.
    pub path: PathBuf,
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl MatchError {
    /// Records `error` against `path`.
    #[must_use]
    pub fn new(path: &Path, error: &SearchError) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// A query that was dropped because it could not be prepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError {
    /// Position of the query in the caller's list.
    pub index: usize,
    /// Grammar the query was prepared for, if any.
    pub grammar: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl QueryError {
    /// Records `error` for the query at `index`.
    #[must_use]
    pub fn new(index: usize, grammar: Option<&str>, error: &SearchError) -> Self {
        Self {
            index,
            grammar: grammar.map(str::to_owned),
            message: error.to_string(),
        }
    }
}
