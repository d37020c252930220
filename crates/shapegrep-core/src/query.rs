//! Query preprocessing.
//!
//! A [`Query`] is a parsed snippet rooted at a single node plus the
//! unique-token set consumed by the shallow pre-filter. Queries are prepared
//! once per grammar and are immutable afterwards.

use tracing::debug;

use crate::error::SearchError;
use crate::grammar::Grammar;
use crate::mode::CaseSensitivity;
use crate::node::{CHILDREN_KEY, Field, Node, STATEMENTS_KIND};
use crate::wildcard::{TextPattern, Wildcard, classify, has_wildcard};

/// A parsed query ready for matching.
#[derive(Debug, Clone)]
pub struct Query {
    index: usize,
    source: String,
    root: Node,
    multi_statement: bool,
    unique_tokens: Vec<String>,
    case: CaseSensitivity,
}

impl Query {
    /// Parses `source` with `grammar`.
    ///
    /// A single statement roots the query at that statement, unwrapping an
    /// expression-statement wrapper. Several statements are gathered under a
    /// synthetic [`STATEMENTS_KIND`] root.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] for blank snippets and
    /// [`SearchError::QueryParse`] if the grammar rejects the snippet.
    pub fn prepare(
        index: usize,
        source: &str,
        grammar: &dyn Grammar,
        case: CaseSensitivity,
    ) -> Result<Self, SearchError> {
        if source.trim().is_empty() {
            return Err(SearchError::EmptyQuery { index });
        }

        let mut statements = grammar
            .parse_query(source)
            .map_err(|source| SearchError::QueryParse {
                index,
                grammar: grammar.name().to_owned(),
                source,
            })?;

        let (root, multi_statement) = match statements.len() {
            0 => return Err(SearchError::EmptyQuery { index }),
            1 => {
                let statement = statements.remove(0);
                (unwrap_statement(grammar, statement), false)
            }
            _ => (statements_root(statements), true),
        };

        let unique_tokens = collect_unique_tokens(grammar, &root, case);
        debug!(
            index,
            grammar = grammar.name(),
            root = root.kind(),
            tokens = unique_tokens.len(),
            "prepared query"
        );

        Ok(Self {
            index,
            source: source.to_owned(),
            root,
            multi_statement,
            unique_tokens,
            case,
        })
    }

    /// Position of the query in the caller's list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The query text as supplied.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root node matched against file candidates.
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Whether the query consists of several sibling statements.
    #[must_use]
    pub const fn is_multi_statement(&self) -> bool {
        self.multi_statement
    }

    /// Literal tokens that must occur in a file for a match to be possible.
    ///
    /// Tokens are already case-folded when the query is case-insensitive.
    #[must_use]
    pub fn unique_tokens(&self) -> &[String] {
        &self.unique_tokens
    }

    /// Case handling applied to token comparisons.
    #[must_use]
    pub const fn case(&self) -> CaseSensitivity {
        self.case
    }
}

fn unwrap_statement(grammar: &dyn Grammar, statement: Node) -> Node {
    if !grammar.is_statement_wrapper(statement.kind()) {
        return statement;
    }
    match statement.children() {
        [inner] => inner.clone(),
        _ => statement,
    }
}

fn statements_root(statements: Vec<Node>) -> Node {
    let span = statements
        .iter()
        .map(Node::span)
        .copied()
        .reduce(|covered, span| covered.cover(&span))
        .unwrap_or_default();
    Node::new(STATEMENTS_KIND, span).with_field(CHILDREN_KEY, Field::List(statements))
}

fn collect_unique_tokens(grammar: &dyn Grammar, root: &Node, case: CaseSensitivity) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        stack.extend(node.child_nodes());

        let kind = node.kind();
        if !(grammar.is_identifier_kind(kind) || grammar.is_string_kind(kind)) {
            continue;
        }
        let Some(text) = node.text() else {
            continue;
        };

        let mut push = |literal: &str| {
            if literal.is_empty() {
                return;
            }
            let folded = case.fold(literal).into_owned();
            if !tokens.contains(&folded) {
                tokens.push(folded);
            }
        };

        match classify(text) {
            Some(Wildcard::Single(_) | Wildcard::Spread(_)) => {}
            _ if has_wildcard(text) => TextPattern::parse(text).literals().for_each(&mut push),
            _ => push(text),
        }
    }

    tokens.sort();
    tokens
}
