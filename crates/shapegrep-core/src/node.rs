//! Generic syntax tree model consumed by the matcher.
//!
//! Every grammar adapter lowers its native tree into [`Node`] values: a type
//! tag, an ordered list of keyed [`Field`]s and a [`Span`]. The comparator
//! only ever talks to this shape, so matching stays independent of the parser
//! that produced the tree.

use serde::{Deserialize, Serialize};

/// Field key holding the scalar text of leaf nodes.
pub const TEXT_KEY: &str = "text";

/// Field key holding named children that the grammar did not label.
pub const CHILDREN_KEY: &str = "children";

/// Field key holding unlabelled keyword tokens (for example `async`).
pub const KEYWORDS_KEY: &str = "keywords";

/// Type tag of the synthetic root built for multi-statement queries.
pub const STATEMENTS_KIND: &str = "statements";

/// A zero-based line and column position.
///
/// Columns count bytes within the line, matching Tree-sitter conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineCol {
    /// Zero-indexed line number.
    pub line: u32,
    /// Zero-indexed byte column within the line.
    pub column: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A half-open byte range plus its line/column equivalents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start_byte: usize,
    /// End byte offset (exclusive).
    pub end_byte: usize,
    /// Start position.
    pub start: LineCol,
    /// End position.
    pub end: LineCol,
}

impl Span {
    /// Creates a span from byte offsets and positions.
    #[must_use]
    pub const fn new(start_byte: usize, end_byte: usize, start: LineCol, end: LineCol) -> Self {
        Self {
            start_byte,
            end_byte,
            start,
            end,
        }
    }

    /// Returns the byte range covered by this span.
    #[must_use]
    pub const fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte..self.end_byte
    }

    /// Returns whether `other` lies entirely within this span.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Returns the smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(&self, other: &Self) -> Self {
        let (start_byte, start) = if other.start_byte < self.start_byte {
            (other.start_byte, other.start)
        } else {
            (self.start_byte, self.start)
        };
        let (end_byte, end) = if other.end_byte > self.end_byte {
            (other.end_byte, other.end)
        } else {
            (self.end_byte, self.end)
        };
        Self::new(start_byte, end_byte, start, end)
    }
}

/// The value stored under one key of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    /// A single child node.
    Node(Box<Node>),
    /// An ordered list of child nodes.
    List(Vec<Node>),
    /// A scalar value such as identifier text, an operator or a keyword.
    Text(String),
}

impl Field {
    /// Returns the child nodes held by this field.
    ///
    /// A single child is viewed as a one-element slice; scalars yield an
    /// empty slice.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        match self {
            Self::Node(node) => std::slice::from_ref(node.as_ref()),
            Self::List(nodes) => nodes,
            Self::Text(_) => &[],
        }
    }

    /// Returns the scalar text, if this field is a scalar.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Node(_) | Self::List(_) => None,
        }
    }
}

/// A generic syntax tree node.
///
/// Invariant: the span of every node contains the spans of all of its
/// descendants. Adapters are responsible for upholding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    kind: String,
    fields: Vec<(String, Field)>,
    span: Span,
}

impl Node {
    /// Creates a node without fields.
    #[must_use]
    pub fn new(kind: impl Into<String>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
            span,
        }
    }

    /// Creates a leaf node carrying scalar text under [`TEXT_KEY`].
    #[must_use]
    pub fn leaf(kind: impl Into<String>, text: impl Into<String>, span: Span) -> Self {
        Self::new(kind, span).with_field(TEXT_KEY, Field::Text(text.into()))
    }

    /// Adds a field and returns the node, for builder-style construction.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.push_field(key, field);
        self
    }

    /// Appends a field. A later field with an existing key replaces it.
    pub fn push_field(&mut self, key: impl Into<String>, field: Field) {
        let key = key.into();
        if let Some(slot) = self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = field;
        } else {
            self.fields.push((key, field));
        }
    }

    /// Returns the node's type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the node's source span.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Returns all fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, Field)] {
        &self.fields
    }

    /// Looks up a field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find_map(|(existing, field)| (existing == key).then_some(field))
    }

    /// Returns the scalar text stored under [`TEXT_KEY`].
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.field(TEXT_KEY).and_then(Field::text)
    }

    /// Returns the nodes stored under [`CHILDREN_KEY`].
    #[must_use]
    pub fn children(&self) -> &[Node] {
        self.field(CHILDREN_KEY).map(Field::nodes).unwrap_or_default()
    }

    /// Iterates over every direct child node across all structural fields.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Self> {
        self.fields.iter().flat_map(|(_, field)| field.nodes())
    }
}

/// Maps byte offsets of a source text to zero-based line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Indexes the line starts of `source`.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter_map(|(offset, byte)| (byte == b'\n').then_some(offset + 1)),
        );
        Self { line_starts }
    }

    /// Returns the position of `offset`.
    #[must_use]
    pub fn position(&self, offset: usize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or_default();
        LineCol::new(
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(offset.saturating_sub(line_start)).unwrap_or(u32::MAX),
        )
    }

    /// Builds a span for the byte range `start..end`.
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(start, end, self.position(start), self.position(end))
    }
}
