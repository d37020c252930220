//! Wildcard vocabulary for query tokens.
//!
//! Queries mark placeholders lexically inside identifiers and strings:
//!
//! - `$$` matches any single node, `$$$` any run of sibling nodes;
//! - either may carry a name (`$$name`, `$$$rest`) which labels the wildcard;
//! - a token that merely contains `$$` (such as `on$$` or `$$assets$$.jpg`)
//!   is a partial pattern where every `$` run matches any characters;
//! - the numeric literal `0x0` matches any numeric literal.
//!
//! Wildcards never occur in file trees, only in query trees.

use crate::mode::CaseSensitivity;

/// Token standing for any single node.
pub const SINGLE_WILDCARD: &str = "$$";

/// Token standing for any run of sibling nodes.
pub const SPREAD_WILDCARD: &str = "$$$";

/// Numeric literal standing for any numeric literal.
pub const NUMERIC_WILDCARD: &str = "0x0";

/// A whole-token wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard<'a> {
    /// `$$` or `$$name`.
    Single(Option<&'a str>),
    /// `$$$` or `$$$name`.
    Spread(Option<&'a str>),
    /// The numeric wildcard `0x0`.
    Numeric,
}

impl Wildcard<'_> {
    /// Returns the wildcard's name, if it has one.
    #[must_use]
    pub const fn name(&self) -> Option<&str> {
        match self {
            Self::Single(name) | Self::Spread(name) => *name,
            Self::Numeric => None,
        }
    }

    /// Returns whether this wildcard absorbs a run of siblings.
    #[must_use]
    pub const fn is_spread(&self) -> bool {
        matches!(self, Self::Spread(_))
    }

    /// Returns the tie-break strength of this wildcard.
    #[must_use]
    pub const fn strength(&self) -> IdentifierStrength {
        match self.name() {
            Some(_) => IdentifierStrength::Named,
            None => IdentifierStrength::Unnamed,
        }
    }
}

/// Classifies a token as a whole-token wildcard.
///
/// Returns `None` for literals and for partial patterns; use
/// [`has_wildcard`] to detect the latter.
#[must_use]
pub fn classify(token: &str) -> Option<Wildcard<'_>> {
    if token == NUMERIC_WILDCARD {
        return Some(Wildcard::Numeric);
    }

    let (rest, spread) = if let Some(rest) = token.strip_prefix(SPREAD_WILDCARD) {
        (rest, true)
    } else {
        (token.strip_prefix(SINGLE_WILDCARD)?, false)
    };

    let name = match rest {
        "" => None,
        name if name.chars().all(is_name_char) => Some(name),
        _ => return None,
    };

    Some(if spread {
        Wildcard::Spread(name)
    } else {
        Wildcard::Single(name)
    })
}

const fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns whether `token` contains a wildcard marker anywhere.
#[must_use]
pub fn has_wildcard(token: &str) -> bool {
    token.contains(SINGLE_WILDCARD)
}

/// Tie-break ordinal for greedy child assignment.
///
/// Ordered weakest first, so sorting by descending strength resolves concrete
/// literals before generic wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentifierStrength {
    /// An unnamed wildcard such as `$$`.
    Unnamed,
    /// A named wildcard or a partial pattern.
    Named,
    /// A concrete literal.
    Literal,
}

/// Returns the tie-break strength of a single token.
#[must_use]
pub fn token_strength(token: &str) -> IdentifierStrength {
    match classify(token) {
        Some(Wildcard::Numeric) => IdentifierStrength::Unnamed,
        Some(wildcard) => wildcard.strength(),
        None if has_wildcard(token) => IdentifierStrength::Named,
        None => IdentifierStrength::Literal,
    }
}

/// One piece of a partial pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Any,
}

/// A token split into literal pieces and wildcard runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPattern<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> TextPattern<'a> {
    /// Splits `token` on runs of two or more `$`.
    #[must_use]
    pub fn parse(token: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let bytes = token.as_bytes();
        let mut index = 0;

        while index < bytes.len() {
            let run = bytes
                .get(index..)
                .map(|tail| tail.iter().take_while(|byte| **byte == b'$').count())
                .unwrap_or_default();
            if run >= 2 {
                if let Some(literal) = token.get(literal_start..index).filter(|s| !s.is_empty()) {
                    segments.push(Segment::Literal(literal));
                }
                if segments.last() != Some(&Segment::Any) {
                    segments.push(Segment::Any);
                }
                index += run;
                literal_start = index;
            } else {
                index += run.max(1);
            }
        }

        if let Some(literal) = token.get(literal_start..).filter(|s| !s.is_empty()) {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Returns the literal pieces of the pattern.
    pub fn literals(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Literal(text) => Some(*text),
            Segment::Any => None,
        })
    }

    /// Returns whether `text` matches the whole pattern.
    #[must_use]
    pub fn matches(&self, text: &str, case: CaseSensitivity) -> bool {
        let folded_text = case.fold(text);
        let mut rest: &str = &folded_text;
        let mut anchored = true;
        let last = self.segments.len().saturating_sub(1);

        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Any => anchored = false,
                Segment::Literal(raw) => {
                    let folded = case.fold(raw);
                    let needle: &str = &folded;
                    if position == last && !anchored {
                        return rest.ends_with(needle);
                    }
                    if anchored {
                        let Some(tail) = rest.strip_prefix(needle) else {
                            return false;
                        };
                        rest = tail;
                    } else {
                        let Some(found) = rest.find(needle) else {
                            return false;
                        };
                        rest = rest.get(found + needle.len()..).unwrap_or_default();
                    }
                    anchored = true;
                }
            }
        }

        !anchored || rest.is_empty()
    }
}

/// Compares a query token with a file token, honouring wildcards.
#[must_use]
pub fn text_matches(query: &str, file: &str, case: CaseSensitivity) -> bool {
    match classify(query) {
        Some(Wildcard::Single(_) | Wildcard::Spread(_)) => true,
        Some(Wildcard::Numeric) | None if !has_wildcard(query) => case.eq(query, file),
        Some(Wildcard::Numeric) | None => TextPattern::parse(query).matches(file, case),
    }
}
