//! Candidate collection over file trees.

use crate::grammar::Grammar;
use crate::node::Node;

use super::compare::is_compatible_kind;

/// Returns every node of `root` whose type admits `query_root`, in pre-order.
///
/// Every node is visited exactly once, so nested and sibling candidates are
/// all reported.
pub(crate) fn collect_candidates<'f>(
    grammar: &dyn Grammar,
    root: &'f Node,
    query_root: &Node,
) -> Vec<&'f Node> {
    let mut candidates = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if is_compatible_kind(grammar, node, query_root) {
            candidates.push(node);
        }
        let first_child = stack.len();
        stack.extend(node.child_nodes());
        if let Some(pushed) = stack.get_mut(first_child..) {
            pushed.reverse();
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::CaseSensitivity;
    use crate::query::Query;
    use crate::tests::support::{SexpGrammar, file_root, query_node};

    fn kinds_and_starts(file: &str, query: &str) -> Vec<(String, usize)> {
        let root = file_root(file);
        let query = query_node(query);
        collect_candidates(&SexpGrammar, &root, &query)
            .into_iter()
            .map(|node| (node.kind().to_owned(), node.span().start_byte))
            .collect()
    }

    #[test]
    fn collects_nested_candidates_in_pre_order() {
        let found = kinds_and_starts(
            "(call callee=ident:a (args (call callee=ident:b))) (call callee=ident:c)",
            "(call callee=ident:$$)",
        );
        assert_eq!(
            found,
            vec![
                (String::from("call"), 0),
                (String::from("call"), 27),
                (String::from("call"), 51),
            ]
        );
    }

    #[test]
    fn wildcard_root_admits_every_node() {
        let found = kinds_and_starts("(call callee=ident:a)", "ident:$$");
        let kinds: Vec<_> = found.into_iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, ["program", "call", "ident"]);
    }

    #[test]
    fn statements_root_admits_blocks() {
        let root = file_root("(func name=ident:f body=(block (stmt ident:a)))");
        let query = Query::prepare(
            0,
            "(import ident:A) (import ident:B)",
            &SexpGrammar,
            CaseSensitivity::Sensitive,
        )
        .unwrap_or_else(|error| panic!("query should prepare: {error}"));
        let kinds: Vec<_> = collect_candidates(&SexpGrammar, &root, query.root())
            .into_iter()
            .map(Node::kind)
            .collect();
        assert_eq!(kinds, ["program", "block"]);
    }
}
