//! Contract between the matching core and parser adapters.
//!
//! The core never parses source itself. A [`Grammar`] turns source text into
//! [`Node`] trees and answers the handful of kind-level questions the
//! comparator needs; a [`GrammarSet`] picks the grammar for each file.

use std::path::Path;
use std::time::Duration;

use crate::error::ParseFailure;
use crate::node::Node;

/// Limits applied while parsing one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum wall-clock time spent parsing, if bounded.
    pub timeout: Option<Duration>,
}

/// A parser adapter for one language.
pub trait Grammar: Send + Sync {
    /// Short lower-case name used in logs and error records.
    fn name(&self) -> &str;

    /// Parses a whole source file into its root node.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] if the source is not valid syntax or the
    /// limits are exceeded.
    fn parse_file(&self, source: &str, limits: ParseLimits) -> Result<Node, ParseFailure>;

    /// Parses a query snippet into its top-level statements.
    ///
    /// Wildcard tokens must survive in the scalar text of the returned nodes
    /// in their `$$` form.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] if the snippet is not valid syntax.
    fn parse_query(&self, source: &str) -> Result<Vec<Node>, ParseFailure>;

    /// Returns whether nodes of `kind` are identifier-like.
    fn is_identifier_kind(&self, kind: &str) -> bool;

    /// Returns whether nodes of `kind` are string literals.
    fn is_string_kind(&self, kind: &str) -> bool;

    /// Returns whether nodes of `kind` are numeric literals.
    fn is_numeric_kind(&self, kind: &str) -> bool;

    /// Returns whether nodes of `kind` hold a statement list under
    /// [`crate::CHILDREN_KEY`].
    fn is_block_kind(&self, kind: &str) -> bool;

    /// Returns whether `kind` wraps a single expression as a statement.
    fn is_statement_wrapper(&self, kind: &str) -> bool;

    /// Returns whether `node` takes part in comparisons.
    ///
    /// Adapters exclude non-semantic nodes such as comments.
    fn should_compare_node(&self, node: &Node) -> bool {
        let _ = node;
        true
    }
}

/// Selects the grammar for a file.
pub trait GrammarSet: Send + Sync {
    /// Returns the grammar handling `path`, if any.
    fn grammar_for(&self, path: &Path) -> Option<&dyn Grammar>;
}
