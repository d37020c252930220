//! Assembly of matches for queries made of several statements.

use crate::error::SearchError;
use crate::mode::Mode;
use crate::node::{Node, Span};

use super::Matcher;
use super::shape::is_spread;

impl Matcher<'_> {
    /// Matches each query statement against the direct statements of `block`.
    ///
    /// In the include modes every query statement, in query order, claims the
    /// first unclaimed file statement that validates. The returned span runs
    /// from the earliest claimed statement to the latest one. In
    /// [`Mode::IncludeWithOrder`] the claimed statements must also follow
    /// query order. [`Mode::Exact`] instead looks for a run of consecutive
    /// statements (see [`Matcher::consecutive_run`]).
    ///
    /// # Errors
    ///
    /// Propagates structural invariant violations from the validator.
    pub(crate) fn assemble_multiline(
        &self,
        block: &Node,
        statements: &Node,
    ) -> Result<Option<Span>, SearchError> {
        let file_statements = self.comparable(block.children());
        let query_statements = self.comparable(statements.children());
        if self.mode == Mode::Exact {
            return self.consecutive_run(&file_statements, &query_statements);
        }

        let mut taken = vec![false; file_statements.len()];
        let mut claimed: Vec<usize> = Vec::new();
        let mut covered: Option<Span> = None;

        let wanted = query_statements
            .into_iter()
            .filter(|statement| !is_spread(self.grammar, statement));

        for query_statement in wanted {
            let mut found = None;
            for (position, file_statement) in file_statements.iter().enumerate() {
                if taken.get(position).copied().unwrap_or(true) {
                    continue;
                }
                if self.validate(file_statement, query_statement)? {
                    found = Some((position, *file_statement.span()));
                    break;
                }
            }

            let Some((position, span)) = found else {
                return Ok(None);
            };
            if let Some(slot) = taken.get_mut(position) {
                *slot = true;
            }
            claimed.push(position);
            covered = Some(covered.map_or(span, |so_far| so_far.cover(&span)));
        }

        if self.mode == Mode::IncludeWithOrder
            && !claimed
                .windows(2)
                .all(|pair| matches!(pair, [earlier, later] if earlier < later))
        {
            return Ok(None);
        }

        Ok(covered)
    }

    /// Finds the first run of consecutive file statements that matches the
    /// query statements one to one, in order.
    ///
    /// Leading and trailing spreads are dropped since a run never has to
    /// account for its neighbours. Inner spreads absorb statements as in any
    /// exact list.
    fn consecutive_run(&self, file: &[&Node], query: &[&Node]) -> Result<Option<Span>, SearchError> {
        let first = query.iter().position(|statement| !is_spread(self.grammar, statement));
        let last = query.iter().rposition(|statement| !is_spread(self.grammar, statement));
        let Some(core) = first.zip(last).and_then(|(from, to)| query.get(from..=to)) else {
            return Ok(None);
        };

        for start in 0..file.len() {
            for end in start + 1..=file.len() {
                let Some(run) = file.get(start..end) else {
                    continue;
                };
                if !self.validate_list(run, core)? {
                    continue;
                }
                if let (Some(head), Some(tail)) = (run.first(), run.last()) {
                    return Ok(Some(head.span().cover(tail.span())));
                }
            }
        }
        Ok(None)
    }
}
