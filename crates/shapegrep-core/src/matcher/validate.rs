//! Recursive match validation.

use crate::error::SearchError;
use crate::mode::Mode;
use crate::node::{Field, Node};

use super::Matcher;
use super::compare::compare_level;
use super::shape::{is_spread, is_spread_wrapper, node_strength};

impl Matcher<'_> {
    /// Validates `file` against the full query subtree rooted at `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::StructuralInvariant`] if the comparator hands
    /// back key lists that do not pair up.
    pub(crate) fn validate(&self, file: &Node, query: &Node) -> Result<bool, SearchError> {
        let level = compare_level(self.grammar, self.mode, self.case, file, query);
        if !level.matched {
            return Ok(false);
        }
        if level.file_keys.len() != level.query_keys.len() {
            return Err(SearchError::structural_invariant(format!(
                "`{}` yielded {} file keys but {} query keys",
                query.kind(),
                level.file_keys.len(),
                level.query_keys.len()
            )));
        }

        for (file_key, query_key) in level.file_keys.iter().zip(&level.query_keys) {
            let (Some(file_field), Some(query_field)) = (file.field(file_key), query.field(query_key))
            else {
                return Err(SearchError::structural_invariant(format!(
                    "`{}` paired key `{file_key}` with `{query_key}` but one side is missing",
                    query.kind()
                )));
            };
            if file_key != query_key {
                return Err(SearchError::structural_invariant(format!(
                    "`{}` paired key `{file_key}` with `{query_key}`",
                    query.kind()
                )));
            }
            if !self.validate_field(file_field, query_field)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn validate_field(&self, file: &Field, query: &Field) -> Result<bool, SearchError> {
        match (file, query) {
            (Field::Node(file_node), Field::Node(query_node)) => {
                self.validate(file_node, query_node)
            }
            _ => self.validate_list(
                &self.comparable(file.nodes()),
                &self.comparable(query.nodes()),
            ),
        }
    }

    /// Drops children the grammar excludes from comparison.
    pub(crate) fn comparable<'n>(&self, nodes: &'n [Node]) -> Vec<&'n Node> {
        nodes
            .iter()
            .filter(|node| self.grammar.should_compare_node(node))
            .collect()
    }

    /// Validates a file child list against a query child list under the mode.
    pub(crate) fn validate_list(&self, file: &[&Node], query: &[&Node]) -> Result<bool, SearchError> {
        match self.mode {
            Mode::Exact if query.iter().any(|node| is_spread(self.grammar, node)) => {
                SequenceMatcher {
                    matcher: self,
                    file,
                    query,
                }
                .matches(0, 0)
            }
            Mode::Exact => {
                if file.len() != query.len() {
                    return Ok(false);
                }
                for (file_child, query_child) in file.iter().zip(query) {
                    if !self.validate(file_child, query_child)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Mode::Include | Mode::IncludeWithOrder | Mode::Text => {
                self.validate_unordered(file, query)
            }
        }
    }

    /// Greedy strength-ordered assignment of query children to file children.
    ///
    /// Spreads are dropped. Remaining query children are visited strongest
    /// first, stable among equals, and each claims the first unclaimed file
    /// child that validates. In [`Mode::IncludeWithOrder`] the claimed
    /// positions, read in query order, must be strictly increasing.
    fn validate_unordered(&self, file: &[&Node], query: &[&Node]) -> Result<bool, SearchError> {
        let mut pending: Vec<(usize, &Node)> = query
            .iter()
            .copied()
            .filter(|node| !is_spread(self.grammar, node))
            .enumerate()
            .collect();
        if pending.len() > file.len() {
            return Ok(false);
        }

        pending.sort_by_key(|(_, node)| std::cmp::Reverse(node_strength(self.grammar, node)));

        let mut taken = vec![false; file.len()];
        let mut claimed = vec![0_usize; pending.len()];

        for (query_position, query_child) in pending {
            let mut found = None;
            for (file_position, file_child) in file.iter().enumerate() {
                if taken.get(file_position).copied().unwrap_or(true) {
                    continue;
                }
                if self.validate(file_child, query_child)? {
                    found = Some(file_position);
                    break;
                }
            }

            let Some(file_position) = found else {
                return Ok(false);
            };
            if let Some(slot) = taken.get_mut(file_position) {
                *slot = true;
            }
            if let Some(slot) = claimed.get_mut(query_position) {
                *slot = file_position;
            }
        }

        if self.mode == Mode::IncludeWithOrder {
            return Ok(claimed
                .windows(2)
                .all(|pair| matches!(pair, [earlier, later] if earlier < later)));
        }
        Ok(true)
    }
}

/// Ordered backtracking over a child list containing spreads.
///
/// Each spread absorbs zero or more file siblings, and a spread wrapper only
/// siblings of its own kind. Every other query child consumes exactly one.
struct SequenceMatcher<'m, 'g, 'f, 'q> {
    matcher: &'m Matcher<'g>,
    file: &'m [&'f Node],
    query: &'m [&'q Node],
}

impl SequenceMatcher<'_, '_, '_, '_> {
    fn matches(&self, file_index: usize, query_index: usize) -> Result<bool, SearchError> {
        let Some(query_child) = self.query.get(query_index).copied() else {
            return Ok(file_index == self.file.len());
        };

        if is_spread(self.matcher.grammar, query_child) {
            let absorbed_kind =
                is_spread_wrapper(self.matcher.grammar, query_child).then_some(query_child.kind());
            for next in file_index..=self.file.len() {
                if self.matches(next, query_index + 1)? {
                    return Ok(true);
                }
                let absorbs_next = absorbed_kind.is_none_or(|kind| {
                    matches!(self.file.get(next), Some(sibling) if sibling.kind() == kind)
                });
                if !absorbs_next {
                    return Ok(false);
                }
            }
            return Ok(false);
        }

        let Some(file_child) = self.file.get(file_index).copied() else {
            return Ok(false);
        };
        if !self.matcher.validate(file_child, query_child)? {
            return Ok(false);
        }
        self.matches(file_index + 1, query_index + 1)
    }
}
