//! Lowering of Tree-sitter trees into core [`Node`] values.
//!
//! Named children are grouped under their field name, or under
//! [`CHILDREN_KEY`] when unfielded. Anonymous tokens carrying a field name
//! (operators, mostly) become scalar text under that field, and unfielded
//! tokens other than bracketing punctuation are joined under
//! [`KEYWORDS_KEY`]. Comments and other extras are dropped.

use shapegrep_core::{CHILDREN_KEY, Field, KEYWORDS_KEY, LineCol, Node, Span};

use crate::placeholder;

/// Punctuation that never distinguishes two otherwise equal nodes.
const LAYOUT_PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';', ':', '.', '"', '\'', '`'];

const QUOTES: &[char] = &['"', '\'', '`'];

pub(crate) struct Converter<'s> {
    source: &'s str,
    string_kinds: &'static [&'static str],
    restore_placeholders: bool,
}

impl<'s> Converter<'s> {
    pub(crate) const fn new(source: &'s str, string_kinds: &'static [&'static str]) -> Self {
        Self {
            source,
            string_kinds,
            restore_placeholders: false,
        }
    }

    /// Turns wildcard placeholders back into `$` runs in every scalar.
    pub(crate) const fn restoring_placeholders(mut self, restore: bool) -> Self {
        self.restore_placeholders = restore;
        self
    }

    pub(crate) fn convert(&self, node: tree_sitter::Node<'_>) -> Node {
        let kind = node.kind();
        let span = span_of(node);

        if self.string_kinds.contains(&kind) {
            return Node::leaf(kind, self.scalar(self.string_text(node)), span);
        }
        if node.named_child_count() == 0 {
            return Node::leaf(kind, self.scalar(&self.token_text(node)), span);
        }

        let mut groups: Vec<(&'static str, Vec<Node>)> = Vec::new();
        let mut scalars: Vec<(&'static str, String)> = Vec::new();
        let mut keywords: Vec<&'static str> = Vec::new();

        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if !child.is_extra() {
                    match (child.is_named(), cursor.field_name()) {
                        (true, field) => {
                            push_group(&mut groups, field.unwrap_or(CHILDREN_KEY), self.convert(child));
                        }
                        (false, Some(field)) => push_scalar(&mut scalars, field, child.kind()),
                        (false, None) if is_significant(child.kind()) => keywords.push(child.kind()),
                        (false, None) => {}
                    }
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        let mut converted = Node::new(kind, span);
        for (key, text) in scalars {
            converted.push_field(key, Field::Text(text));
        }
        if !keywords.is_empty() {
            converted.push_field(KEYWORDS_KEY, Field::Text(keywords.join(" ")));
        }
        for (key, nodes) in groups {
            converted.push_field(key, group_field(key, nodes));
        }
        debug_assert!(
            converted.child_nodes().all(|child| span.contains(child.span())),
            "`{kind}` does not contain all of its children"
        );
        converted
    }

    fn scalar(&self, text: &str) -> String {
        if self.restore_placeholders {
            placeholder::restore(text).into_owned()
        } else {
            text.to_owned()
        }
    }

    fn text_of(&self, range: std::ops::Range<usize>) -> &'s str {
        self.source.get(range).unwrap_or_default()
    }

    /// Returns the content of a string literal without its delimiters.
    fn string_text(&self, node: tree_sitter::Node<'_>) -> &'s str {
        let count = node.child_count();
        let first = node.child(0);
        let last = count.checked_sub(1).and_then(|index| node.child(index));

        match (first, last) {
            (Some(open), Some(close)) if count >= 2 => {
                self.text_of(open.end_byte()..close.start_byte())
            }
            (Some(only), _) => self.text_of(only.byte_range()),
            _ => self.text_of(node.byte_range()).trim_matches(QUOTES),
        }
    }

    /// Returns the text of a node without named children, ignoring layout
    /// between its anonymous tokens.
    fn token_text(&self, node: tree_sitter::Node<'_>) -> String {
        let text = self.text_of(node.byte_range());
        if node.child_count() == 0 {
            text.to_owned()
        } else {
            text.split_whitespace().collect()
        }
    }
}

fn push_group(groups: &mut Vec<(&'static str, Vec<Node>)>, key: &'static str, node: Node) {
    match groups.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, nodes)) => nodes.push(node),
        None => groups.push((key, vec![node])),
    }
}

fn push_scalar(scalars: &mut Vec<(&'static str, String)>, key: &'static str, token: &str) {
    match scalars.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, text)) => {
            text.push(' ');
            text.push_str(token);
        }
        None => scalars.push((key, token.to_owned())),
    }
}

fn group_field(key: &str, nodes: Vec<Node>) -> Field {
    if key == CHILDREN_KEY {
        return Field::List(nodes);
    }
    match <[Node; 1]>::try_from(nodes) {
        Ok([single]) => Field::Node(Box::new(single)),
        Err(many) => Field::List(many),
    }
}

fn is_significant(token: &str) -> bool {
    !token.is_empty() && !token.chars().all(|ch| LAYOUT_PUNCTUATION.contains(&ch))
}

fn span_of(node: tree_sitter::Node<'_>) -> Span {
    Span::new(
        node.start_byte(),
        node.end_byte(),
        position(node.start_position()),
        position(node.end_position()),
    )
}

fn position(point: tree_sitter::Point) -> LineCol {
    LineCol::new(
        u32::try_from(point.row).unwrap_or(u32::MAX),
        u32::try_from(point.column).unwrap_or(u32::MAX),
    )
}
