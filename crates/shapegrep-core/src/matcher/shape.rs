//! Node-level wildcard recognition and identifier strength.

use crate::grammar::Grammar;
use crate::node::{CHILDREN_KEY, Node};
use crate::wildcard::{IdentifierStrength, NUMERIC_WILDCARD, Wildcard, classify, token_strength};

/// Returns the wildcard a query node stands for, if any.
///
/// This is either a bare wildcard (see [`bare_wildcard`]) or a spread
/// wrapper: a node whose only field is a named field holding a single spread,
/// such as an import specifier around `$$$`. A wrapper stands for zero or
/// more siblings of its own kind.
pub(crate) fn node_wildcard<'n>(grammar: &dyn Grammar, node: &'n Node) -> Option<Wildcard<'n>> {
    bare_wildcard(grammar, node).or_else(|| spread_wrapper(grammar, node))
}

/// Returns the wildcard a leaf, or a statement wrapper around one, stands for.
///
/// Identifier and string leaves are classified by their text, numeric leaves
/// only by the numeric wildcard. A bare wildcard admits nodes of any kind.
pub(crate) fn bare_wildcard<'n>(grammar: &dyn Grammar, node: &'n Node) -> Option<Wildcard<'n>> {
    let kind = node.kind();

    if let Some(text) = node.text() {
        if grammar.is_identifier_kind(kind) || grammar.is_string_kind(kind) {
            return classify(text).filter(|wildcard| !matches!(wildcard, Wildcard::Numeric));
        }
        if grammar.is_numeric_kind(kind) {
            return (text == NUMERIC_WILDCARD).then_some(Wildcard::Numeric);
        }
        return None;
    }

    if !grammar.is_statement_wrapper(kind) {
        return None;
    }
    let (_, child) = only_child(node)?;
    bare_wildcard(grammar, child).filter(|wildcard| !matches!(wildcard, Wildcard::Numeric))
}

/// Returns the spread a wrapper node stands for.
fn spread_wrapper<'n>(grammar: &dyn Grammar, node: &'n Node) -> Option<Wildcard<'n>> {
    if node.text().is_some() || grammar.is_statement_wrapper(node.kind()) {
        return None;
    }
    let (key, child) = only_child(node)?;
    if key == CHILDREN_KEY {
        return None;
    }
    node_wildcard(grammar, child).filter(|wildcard| wildcard.is_spread())
}

/// Returns whether `node` is a spread wrapper rather than a bare wildcard.
pub(crate) fn is_spread_wrapper(grammar: &dyn Grammar, node: &Node) -> bool {
    spread_wrapper(grammar, node).is_some()
}

/// Returns whether `node` is an open container: a node whose unfielded
/// children are a single spread, such as `[$$$]` or `($$$)`.
///
/// An open container matches any node of its own kind, whatever it holds.
pub(crate) fn is_open_container(grammar: &dyn Grammar, node: &Node) -> bool {
    if node.text().is_some() || grammar.is_statement_wrapper(node.kind()) {
        return false;
    }
    only_child(node).is_some_and(|(key, child)| key == CHILDREN_KEY && is_spread(grammar, child))
}

fn only_child(node: &Node) -> Option<(&str, &Node)> {
    let [(key, field)] = node.fields() else {
        return None;
    };
    let [child] = field.nodes() else {
        return None;
    };
    Some((key.as_str(), child))
}

/// Returns whether `node` is a spread wildcard.
pub(crate) fn is_spread(grammar: &dyn Grammar, node: &Node) -> bool {
    node_wildcard(grammar, node).is_some_and(|wildcard| wildcard.is_spread())
}

/// Ranks a query node for greedy child assignment.
///
/// Wildcards rank by their own strength. Identifier and string leaves rank by
/// their text. Composite nodes take the weakest of their direct identifier or
/// string leaves and count as literal when they have none.
pub(crate) fn node_strength(grammar: &dyn Grammar, node: &Node) -> IdentifierStrength {
    if let Some(wildcard) = node_wildcard(grammar, node) {
        return wildcard.strength();
    }
    if let Some(strength) = leaf_strength(grammar, node) {
        return strength;
    }
    node.child_nodes()
        .filter_map(|child| {
            node_wildcard(grammar, child)
                .map(|wildcard| wildcard.strength())
                .or_else(|| leaf_strength(grammar, child))
        })
        .min()
        .unwrap_or(IdentifierStrength::Literal)
}

fn leaf_strength(grammar: &dyn Grammar, node: &Node) -> Option<IdentifierStrength> {
    let kind = node.kind();
    if !(grammar.is_identifier_kind(kind) || grammar.is_string_kind(kind)) {
        return None;
    }
    node.text().map(token_strength)
}
