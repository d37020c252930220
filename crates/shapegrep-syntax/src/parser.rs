//! Tree-sitter parsing wrapper with time limits and error reporting.
//!
//! Tree-sitter is error-tolerant and always produces a tree. The matcher
//! needs a clean tree, so any ERROR or MISSING node turns into a
//! [`ParseFailure::Syntax`] that points at the first offending position.

use std::time::Duration;

use shapegrep_core::ParseFailure;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;

const CONTEXT_LIMIT: usize = 50;

/// Tree-sitter parser wrapper for a specific language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a new parser for the given language.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tree-sitter parser cannot be initialised
    /// with the language grammar.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(language, e.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Parses `source`, giving up once `timeout` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::TimedOut`] when the limit is hit,
    /// [`ParseFailure::Syntax`] when the tree contains errors and
    /// [`ParseFailure::Unavailable`] if Tree-sitter produced nothing.
    pub fn parse(
        &mut self,
        source: &str,
        timeout: Option<Duration>,
    ) -> Result<tree_sitter::Tree, ParseFailure> {
        self.set_timeout(timeout);
        let Some(tree) = self.inner.parse(source, None) else {
            self.inner.reset();
            return Err(timeout.map_or_else(
                || SyntaxError::parse(self.language, "parser returned no tree").into(),
                |limit| ParseFailure::TimedOut { limit },
            ));
        };

        if let Some(error) = first_error(tree.root_node()) {
            return Err(syntax_failure(error, source));
        }
        Ok(tree)
    }

    #[expect(
        deprecated,
        reason = "the progress-callback API offers nothing beyond a wall-clock budget here"
    )]
    fn set_timeout(&mut self, timeout: Option<Duration>) {
        let micros = timeout.map_or(0, |limit| {
            u64::try_from(limit.as_micros()).unwrap_or(u64::MAX).max(1)
        });
        self.inner.set_timeout_micros(micros);
    }
}

/// Returns the first ERROR or MISSING node in document order.
fn first_error(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found.or(Some(node))
}

fn syntax_failure(node: tree_sitter::Node<'_>, source: &str) -> ParseFailure {
    let (line, column) = point_to_one_based(node.start_position());
    let context = if node.is_missing() {
        format!("missing {}", node.kind())
    } else {
        snippet(source.get(node.byte_range()).unwrap_or_default())
    };
    ParseFailure::syntax(line, column, context)
}

fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > CONTEXT_LIMIT {
        let truncated: String = first_line.chars().take(CONTEXT_LIMIT - 3).collect();
        format!("{truncated}...")
    } else {
        first_line.to_owned()
    }
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}
