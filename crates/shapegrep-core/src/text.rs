//! Plain text search, used by [`crate::Mode::Text`].
//!
//! The query is matched directly against file text. Whitespace runs in the
//! query match any non-empty whitespace run, `$$` runs match any characters
//! within one line, everything else matches literally.

use crate::error::SearchError;
use crate::mode::CaseSensitivity;
use crate::node::{LineIndex, Span};
use crate::prefilter::contains_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Char(char),
    Whitespace,
    AnyInLine,
}

/// A text-mode query.
#[derive(Debug, Clone)]
pub struct TextQuery {
    index: usize,
    pieces: Vec<Piece>,
    unique_tokens: Vec<String>,
    case: CaseSensitivity,
}

impl TextQuery {
    /// Tokenises `source` into literal characters, whitespace runs and
    /// wildcard runs.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] if `source` has no literal text.
    pub fn prepare(index: usize, source: &str, case: CaseSensitivity) -> Result<Self, SearchError> {
        let mut pieces = Vec::new();
        let mut unique_tokens: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut chars = source.trim().chars().peekable();

        while let Some(ch) = chars.next() {
            let piece = if ch.is_whitespace() {
                while chars.next_if(|next| next.is_whitespace()).is_some() {}
                Piece::Whitespace
            } else if ch == '$' && chars.peek() == Some(&'$') {
                while chars.next_if(|next| *next == '$').is_some() {}
                Piece::AnyInLine
            } else {
                literal.push(ch);
                pieces.push(Piece::Char(ch));
                continue;
            };
            flush_literal(&mut literal, &mut unique_tokens, case);
            if pieces.last() != Some(&piece) {
                pieces.push(piece);
            }
        }
        flush_literal(&mut literal, &mut unique_tokens, case);

        if unique_tokens.is_empty() {
            return Err(SearchError::EmptyQuery { index });
        }

        Ok(Self {
            index,
            pieces,
            unique_tokens,
            case,
        })
    }

    /// Position of the query in the caller's list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Literal runs that must occur in a matching file, case-folded when
    /// the query is case-insensitive.
    #[must_use]
    pub fn unique_tokens(&self) -> &[String] {
        &self.unique_tokens
    }

    /// Returns whether `file_text` contains every literal run.
    #[must_use]
    pub fn may_match(&self, file_text: &str) -> bool {
        contains_all(&self.case.fold(file_text), &self.unique_tokens)
    }

    /// Finds leftmost, shortest, non-overlapping matches in `file_text`.
    #[must_use]
    pub fn find_all(&self, file_text: &str) -> Vec<Span> {
        let chars: Vec<(usize, char)> = file_text.char_indices().collect();
        let index = LineIndex::new(file_text);
        let byte_at = |position: usize| {
            chars
                .get(position)
                .map_or(file_text.len(), |(offset, _)| *offset)
        };

        let mut spans = Vec::new();
        let mut at = 0;
        while at < chars.len() {
            match self.match_from(&chars, at, 0) {
                Some(end) if end > at => {
                    spans.push(index.span(byte_at(at), byte_at(end)));
                    at = end;
                }
                _ => at += 1,
            }
        }
        spans
    }

    fn match_from(&self, text: &[(usize, char)], at: usize, piece: usize) -> Option<usize> {
        let Some(current) = self.pieces.get(piece) else {
            return Some(at);
        };

        match current {
            Piece::Char(expected) => {
                let (_, actual) = text.get(at)?;
                if !chars_agree(*expected, *actual, self.case) {
                    return None;
                }
                self.match_from(text, at + 1, piece + 1)
            }
            Piece::Whitespace => {
                let mut end = at;
                while text.get(end).is_some_and(|(_, ch)| ch.is_whitespace()) {
                    end += 1;
                    if let Some(found) = self.match_from(text, end, piece + 1) {
                        return Some(found);
                    }
                }
                None
            }
            Piece::AnyInLine => {
                let mut end = at;
                loop {
                    if let Some(found) = self.match_from(text, end, piece + 1) {
                        return Some(found);
                    }
                    match text.get(end) {
                        Some((_, ch)) if *ch != '\n' => end += 1,
                        _ => return None,
                    }
                }
            }
        }
    }
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<String>, case: CaseSensitivity) {
    if literal.is_empty() {
        return;
    }
    let folded = case.fold(literal).into_owned();
    if !tokens.contains(&folded) {
        tokens.push(folded);
    }
    literal.clear();
}

fn chars_agree(expected: char, actual: char, case: CaseSensitivity) -> bool {
    match case {
        CaseSensitivity::Sensitive => expected == actual,
        CaseSensitivity::Insensitive => expected.to_lowercase().eq(actual.to_lowercase()),
    }
}
