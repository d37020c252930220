//! Structural matching of one query against one file tree.
//!
//! Candidate collection finds every file node whose type admits the query
//! root. The comparator then checks each candidate level by level, and the
//! validator recurses through the structural keys it hands back, applying
//! the list semantics of the active [`Mode`]. Queries made of several
//! statements are assembled from independently matched statements.

mod collect;
mod compare;
mod multiline;
mod shape;
mod validate;


use tracing::warn;

use crate::error::SearchError;
use crate::grammar::Grammar;
use crate::mode::{CaseSensitivity, Mode};
use crate::node::{Node, Span};
use crate::query::Query;

use self::collect::collect_candidates;

/// A file node, or a run of statements, matched by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMatch {
    /// Span covered by the match.
    pub span: Span,
    /// Type tag of the matched node. Multi-statement matches report the
    /// enclosing block's type.
    pub kind: String,
}

/// Everything learned from matching one query against one tree.
#[derive(Debug, Default)]
pub struct TreeScan {
    /// Matches in pre-order of their candidates.
    pub matches: Vec<NodeMatch>,
    /// Number of candidates examined.
    pub candidates: usize,
    /// Candidates abandoned because of internal inconsistencies.
    pub failures: Vec<SearchError>,
}

/// Comparison context shared by the comparator and the validator.
pub(crate) struct Matcher<'g> {
    grammar: &'g dyn Grammar,
    mode: Mode,
    case: CaseSensitivity,
}

impl<'g> Matcher<'g> {
    pub(crate) const fn new(grammar: &'g dyn Grammar, mode: Mode, case: CaseSensitivity) -> Self {
        Self {
            grammar,
            mode,
            case,
        }
    }

    fn match_candidate(&self, candidate: &Node, query: &Query) -> Result<Option<Span>, SearchError> {
        if query.is_multi_statement() {
            return self.assemble_multiline(candidate, query.root());
        }
        Ok(self
            .validate(candidate, query.root())?
            .then(|| *candidate.span()))
    }
}

/// Matches `query` against the tree rooted at `root`.
///
/// A structural invariant violation abandons only the candidate that raised
/// it; the failure is logged and returned alongside the matches.
#[must_use]
pub fn scan_tree(grammar: &dyn Grammar, mode: Mode, root: &Node, query: &Query) -> TreeScan {
    let matcher = Matcher::new(grammar, mode, query.case());
    let mut scan = TreeScan::default();

    for candidate in collect_candidates(grammar, root, query.root()) {
        scan.candidates += 1;
        match matcher.match_candidate(candidate, query) {
            Ok(Some(span)) => scan.matches.push(NodeMatch {
                span,
                kind: candidate.kind().to_owned(),
            }),
            Ok(None) => {}
            Err(error) => {
                warn!(
                    query = query.index(),
                    kind = candidate.kind(),
                    start = candidate.span().start_byte,
                    %error,
                    "abandoned candidate"
                );
                scan.failures.push(error);
            }
        }
    }

    scan
}
