//! Human-readable rendering.

use std::io::{self, Write};
use std::path::Path;

use shapegrep_core::{Match, SearchResults};

/// Writes each match as a `path:line:column` header and a numbered frame.
pub(super) fn render_matches<W: Write>(out: &mut W, matches: &[Match]) -> io::Result<()> {
    for (index, found) in matches.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "{}:{}:{}",
            display_path(&found.path),
            u64::from(found.span.start.line) + 1,
            u64::from(found.span.start.column) + 1,
        )?;
        render_frame(out, found)?;
    }
    Ok(())
}

/// The first line is indented to its original column so that later lines,
/// which start at the beginning of their source line, stay aligned.
fn render_frame<W: Write>(out: &mut W, found: &Match) -> io::Result<()> {
    let first = u64::from(found.span.start.line) + 1;
    let last = u64::from(found.span.end.line) + 1;
    let width = last.max(first).to_string().len();
    let indent = usize::try_from(found.span.start.column).unwrap_or_default();

    for (number, text) in (first..).zip(found.code.lines()) {
        let pad = if number == first { indent } else { 0 };
        writeln!(out, "{number:>width$} | {:pad$}{text}", "")?;
    }
    Ok(())
}

pub(super) fn render_summary<W: Write>(out: &mut W, results: &SearchResults) -> io::Result<()> {
    let mut files: Vec<&Path> = results.matches.iter().map(|found| found.path.as_path()).collect();
    files.dedup();

    if !results.matches.is_empty() {
        writeln!(out)?;
    }
    write!(
        out,
        "{} in {}",
        counted(results.matches.len(), "match", "matches"),
        counted(files.len(), "file", "files"),
    )?;
    if !results.errors.is_empty() {
        write!(out, ", {}", counted(results.errors.len(), "file error", "file errors"))?;
    }
    if !results.query_errors.is_empty() {
        write!(
            out,
            ", {}",
            counted(results.query_errors.len(), "query error", "query errors")
        )?;
    }
    writeln!(out)
}

pub(super) fn render_problems<E: Write>(err: &mut E, results: &SearchResults) -> io::Result<()> {
    if !results.query_errors.is_empty() {
        writeln!(err, "query errors:")?;
        for error in &results.query_errors {
            let number = error.index.saturating_add(1);
            match error.grammar.as_deref() {
                Some(grammar) => writeln!(err, "  query {number} ({grammar}): {}", error.message)?,
                None => writeln!(err, "  query {number}: {}", error.message)?,
            }
        }
    }
    if !results.errors.is_empty() {
        writeln!(err, "file errors:")?;
        for error in &results.errors {
            writeln!(
                err,
                "  {}: [{}] {}",
                display_path(&error.path),
                error.kind,
                error.message
            )?;
        }
    }
    Ok(())
}

fn display_path(path: &Path) -> std::path::Display<'_> {
    path.strip_prefix(".").unwrap_or(path).display()
}

fn counted(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
