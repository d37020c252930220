//! Disguises wildcard `$` runs as identifiers for grammars that reject `$`.
//!
//! A run of `n >= 2` dollars becomes `__sg{n}_`, which is a valid identifier
//! fragment in Python and Rust, so `$$name` parses as `__sg2_name` and
//! `on$$` as `on__sg2_`. After parsing, [`restore`] turns the fragments back
//! into dollars in every scalar of the query tree.

use std::borrow::Cow;

const PREFIX: &str = "__sg";
const SUFFIX: char = '_';

/// Replaces every run of two or more `$` in `source` with a placeholder.
pub(crate) fn disguise(source: &str) -> Cow<'_, str> {
    if !source.contains("$$") {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len() + 8);
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        let mut run = 1_usize;
        while chars.next_if_eq(&'$').is_some() {
            run += 1;
        }
        if run == 1 {
            out.push('$');
        } else {
            out.push_str(PREFIX);
            out.push_str(&run.to_string());
            out.push(SUFFIX);
        }
    }
    Cow::Owned(out)
}

/// Turns placeholders produced by [`disguise`] back into `$` runs.
pub(crate) fn restore(text: &str) -> Cow<'_, str> {
    if !text.contains(PREFIX) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(PREFIX) {
        let (before, tail) = rest.split_at(at);
        out.push_str(before);
        let after_prefix = tail.get(PREFIX.len()..).unwrap_or_default();
        let digits = after_prefix
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(after_prefix.len());
        let count = after_prefix.get(..digits).and_then(|run| run.parse::<usize>().ok());
        let closed = after_prefix
            .get(digits..)
            .is_some_and(|remaining| remaining.starts_with(SUFFIX));

        match count {
            Some(run) if run >= 2 && closed => {
                out.push_str(&"$".repeat(run));
                rest = after_prefix.get(digits + 1..).unwrap_or_default();
            }
            _ => {
                out.push_str(PREFIX);
                rest = after_prefix;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
