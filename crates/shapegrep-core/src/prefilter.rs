//! Shallow pre-filter over raw file text.
//!
//! The filter is a necessary condition only: a `true` answer may still yield
//! no match, but a `false` answer guarantees that full matching finds nothing.

use crate::mode::CaseSensitivity;
use crate::query::Query;

/// Returns whether `file_text` contains every unique token of `query`.
#[must_use]
pub fn may_match(file_text: &str, query: &Query) -> bool {
    contains_all(&query.case().fold(file_text), query.unique_tokens())
}

/// Returns the queries that may match `file_text`.
///
/// The file text is folded at most once, however many queries are supplied.
pub fn candidates<'q>(file_text: &str, queries: &'q [Query]) -> Vec<&'q Query> {
    let folded = queries
        .iter()
        .any(|query| query.case() == CaseSensitivity::Insensitive)
        .then(|| CaseSensitivity::Insensitive.fold(file_text));

    queries
        .iter()
        .filter(|query| {
            let haystack = match (query.case(), folded.as_deref()) {
                (CaseSensitivity::Insensitive, Some(folded)) => folded,
                _ => file_text,
            };
            contains_all(haystack, query.unique_tokens())
        })
        .collect()
}

/// Returns whether `haystack` contains every token.
pub(crate) fn contains_all(haystack: &str, tokens: &[String]) -> bool {
    tokens.iter().all(|token| haystack.contains(token.as_str()))
}
