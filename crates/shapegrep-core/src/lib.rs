//! Structural code search over generic syntax trees.
//!
//! This crate finds code that matches query snippets containing wildcard
//! placeholders, independent of formatting and of the order of unordered
//! children. It never parses source itself: parser adapters implement
//! [`Grammar`] to lower their trees into [`Node`] values, and a
//! [`GrammarSet`] picks the grammar for each file.
//!
//! # Wildcards
//!
//! - `$$` matches any single node and `$$$` any run of sibling nodes.
//! - `$$name` and `$$$name` are labelled forms of the same wildcards.
//! - Identifiers and strings containing `$$`, such as `on$$`, match any text
//!   in place of each `$` run.
//! - `0x0` matches any numeric literal.
//!
//! # Modes
//!
//! - [`Mode::Exact`]: child lists agree in length and order.
//! - [`Mode::Include`]: query children occur among the file children.
//! - [`Mode::IncludeWithOrder`]: as `Include`, keeping query order.
//! - [`Mode::Text`]: plain text search without trees.
//!
//! # Example
//!
//! ```ignore
//! use shapegrep_core::{CancellationToken, SearchSettings, search};
//!
//! let results = search(
//!     &grammars,
//!     &[String::from("console.log($$$)")],
//!     &paths,
//!     &SearchSettings::default(),
//!     &CancellationToken::new(),
//! );
//! for found in &results.matches {
//!     println!("{}:{}", found.path.display(), found.span.start.line + 1);
//! }
//! ```

mod error;
mod grammar;
mod matcher;
mod mode;
mod node;
pub mod prefilter;
mod query;
mod search;
mod text;
pub mod wildcard;

pub use error::{ErrorKind, MatchError, ParseFailure, QueryError, SearchError};
pub use grammar::{Grammar, GrammarSet, ParseLimits};
pub use matcher::{NodeMatch, TreeScan, scan_tree};
pub use mode::{CaseSensitivity, Mode};
pub use node::{
    CHILDREN_KEY, Field, KEYWORDS_KEY, LineCol, LineIndex, Node, STATEMENTS_KIND, Span, TEXT_KEY,
};
pub use query::Query;
pub use search::{
    CancellationToken, Match, SearchResults, SearchSettings, SearchStats, TEXT_MATCH_KIND, search,
};
pub use text::TextQuery;

#[cfg(test)]
mod tests;
