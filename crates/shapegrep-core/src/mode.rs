//! Matching strictness and case handling.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How strictly child lists must agree between query and file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Mode {
    /// Child lists must agree in length and order, modulo wildcards.
    Exact,
    /// Query children must appear somewhere among the file children.
    #[default]
    Include,
    /// Like [`Mode::Include`], but matched children keep the query order.
    IncludeWithOrder,
    /// Plain text search that bypasses syntax trees.
    Text,
}

impl Mode {
    /// Returns whether this mode compares syntax trees.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Whether token comparisons distinguish letter case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Tokens must match exactly.
    #[default]
    Sensitive,
    /// Both sides are lower-cased before comparing.
    Insensitive,
}

impl CaseSensitivity {
    /// Maps a `case_insensitive` flag to a sensitivity.
    #[must_use]
    pub const fn from_insensitive_flag(case_insensitive: bool) -> Self {
        if case_insensitive {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }

    /// Folds `text` for comparison.
    ///
    /// Folding is applied per character so that substring containment is
    /// preserved: if `a` contains `b` then `fold(a)` contains `fold(b)`.
    #[must_use]
    pub fn fold<'a>(self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::Sensitive => Cow::Borrowed(text),
            Self::Insensitive if text.chars().all(folds_to_itself) => Cow::Borrowed(text),
            Self::Insensitive => Cow::Owned(text.chars().flat_map(char::to_lowercase).collect()),
        }
    }

    /// Compares two strings under this sensitivity.
    #[must_use]
    pub fn eq(self, left: &str, right: &str) -> bool {
        match self {
            Self::Sensitive => left == right,
            Self::Insensitive => self.fold(left) == self.fold(right),
        }
    }
}

fn folds_to_itself(ch: char) -> bool {
    let mut lowered = ch.to_lowercase();
    lowered.next() == Some(ch) && lowered.next().is_none()
}
