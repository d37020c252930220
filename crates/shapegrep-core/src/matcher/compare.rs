//! Node-level comparator.
//!
//! Decides whether a file node and a query node agree at their own level and
//! lists the structural keys the validator must descend into. It never
//! recurses and never fails loudly: a mismatch is the common case.

use crate::grammar::Grammar;
use crate::mode::{CaseSensitivity, Mode};
use crate::node::{Field, Node, STATEMENTS_KIND, TEXT_KEY};
use crate::wildcard::{Wildcard, text_matches};

use super::shape::{bare_wildcard, is_open_container, is_spread, node_wildcard};

/// Outcome of comparing one file node with one query node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LevelMatch<'f, 'q> {
    /// Whether the nodes agree at this level.
    pub(crate) matched: bool,
    /// Structural keys of the file node to descend into.
    pub(crate) file_keys: Vec<&'f str>,
    /// Structural keys of the query node, paired by position with `file_keys`.
    pub(crate) query_keys: Vec<&'q str>,
}

impl LevelMatch<'_, '_> {
    const fn mismatch() -> Self {
        Self {
            matched: false,
            file_keys: Vec::new(),
            query_keys: Vec::new(),
        }
    }

    const fn leaf() -> Self {
        Self {
            matched: true,
            file_keys: Vec::new(),
            query_keys: Vec::new(),
        }
    }
}

/// Returns whether the query root's type admits `file` as a candidate.
///
/// Bare wildcard roots admit any node. Spread wrappers and open containers
/// admit nodes of their own kind; the synthetic multi-statement root admits
/// block-like nodes.
pub(crate) fn is_compatible_kind(grammar: &dyn Grammar, file: &Node, query: &Node) -> bool {
    match bare_wildcard(grammar, query) {
        Some(Wildcard::Numeric) => grammar.is_numeric_kind(file.kind()),
        Some(_) => true,
        None if query.kind() == STATEMENTS_KIND => grammar.is_block_kind(file.kind()),
        None => file.kind() == query.kind(),
    }
}

/// Compares `file` and `query` without recursing into children.
pub(crate) fn compare_level<'f, 'q>(
    grammar: &dyn Grammar,
    mode: Mode,
    case: CaseSensitivity,
    file: &'f Node,
    query: &'q Node,
) -> LevelMatch<'f, 'q> {
    if !is_compatible_kind(grammar, file, query) {
        return LevelMatch::mismatch();
    }
    if node_wildcard(grammar, query).is_some() || is_open_container(grammar, query) {
        return LevelMatch::leaf();
    }

    let wildcard_text = grammar.is_identifier_kind(query.kind()) || grammar.is_string_kind(query.kind());
    let mut level = LevelMatch::leaf();

    for (key, query_field) in query.fields() {
        let file_entry = file
            .fields()
            .iter()
            .find(|(file_key, _)| file_key == key);

        match (query_field, file_entry) {
            (Field::Text(query_text), Some((_, Field::Text(file_text)))) => {
                let agrees = if wildcard_text && key == TEXT_KEY {
                    text_matches(query_text, file_text, case)
                } else {
                    case.eq(query_text, file_text)
                };
                if !agrees {
                    return LevelMatch::mismatch();
                }
            }
            (Field::Text(_), _) => return LevelMatch::mismatch(),
            (_, Some((_, Field::Text(_)))) => return LevelMatch::mismatch(),
            (_, Some((file_key, _))) => {
                level.file_keys.push(file_key.as_str());
                level.query_keys.push(key.as_str());
            }
            (_, None) => {
                let absorbs_nothing = query_field
                    .nodes()
                    .iter()
                    .filter(|node| grammar.should_compare_node(node))
                    .all(|node| is_spread(grammar, node));
                if !absorbs_nothing {
                    return LevelMatch::mismatch();
                }
            }
        }
    }

    if mode == Mode::Exact && has_extra_fields(grammar, file, query) {
        return LevelMatch::mismatch();
    }

    level
}

/// Returns whether `file` carries comparable fields the query lacks.
fn has_extra_fields(grammar: &dyn Grammar, file: &Node, query: &Node) -> bool {
    file.fields().iter().any(|(key, field)| {
        if query.field(key).is_some() {
            return false;
        }
        match field {
            Field::Text(_) => true,
            Field::Node(_) | Field::List(_) => field
                .nodes()
                .iter()
                .any(|node| grammar.should_compare_node(node)),
        }
    })
}
