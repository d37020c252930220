//! An s-expression grammar for exercising the matcher without a real parser.
//!
//! Atoms are written `kind:text` and become leaves; lists are written
//! `(kind item...)`. Items prefixed with `key=` are stored under that key,
//! other nodes under [`CHILDREN_KEY`]. A bare `key=word` stores scalar text.
//!
//! Kinds with special meaning: `ident` (identifier), `str` (string), `num`
//! (numeric), `program` and `block` (statement lists), `stmt` (statement
//! wrapper) and `comment` (ignored by comparisons).

use std::path::Path;

use crate::error::ParseFailure;
use crate::grammar::{Grammar, GrammarSet, ParseLimits};
use crate::mode::CaseSensitivity;
use crate::node::{CHILDREN_KEY, Field, LineIndex, Node};
use crate::query::Query;

/// Files containing this marker time out whenever a timeout is configured.
pub(crate) const SLOW_MARKER: &str = "(slow)";

pub(crate) struct SexpGrammar;

impl Grammar for SexpGrammar {
    fn name(&self) -> &str {
        "sexp"
    }

    fn parse_file(&self, source: &str, limits: ParseLimits) -> Result<Node, ParseFailure> {
        if let Some(limit) = limits.timeout {
            if source.contains(SLOW_MARKER) {
                return Err(ParseFailure::TimedOut { limit });
            }
        }

        let index = LineIndex::new(source);
        let items = Reader::new(source, &index).items()?;
        let mut root = Node::new("program", index.span(0, source.len()));
        if !items.is_empty() {
            root.push_field(CHILDREN_KEY, Field::List(items));
        }
        Ok(root)
    }

    fn parse_query(&self, source: &str) -> Result<Vec<Node>, ParseFailure> {
        let index = LineIndex::new(source);
        Reader::new(source, &index).items()
    }

    fn is_identifier_kind(&self, kind: &str) -> bool {
        kind == "ident"
    }

    fn is_string_kind(&self, kind: &str) -> bool {
        kind == "str"
    }

    fn is_numeric_kind(&self, kind: &str) -> bool {
        kind == "num"
    }

    fn is_block_kind(&self, kind: &str) -> bool {
        matches!(kind, "program" | "block")
    }

    fn is_statement_wrapper(&self, kind: &str) -> bool {
        kind == "stmt"
    }

    fn should_compare_node(&self, node: &Node) -> bool {
        node.kind() != "comment"
    }
}

/// Serves [`SexpGrammar`] for `.sx` files.
pub(crate) struct SexpGrammars;

impl GrammarSet for SexpGrammars {
    fn grammar_for(&self, path: &Path) -> Option<&dyn Grammar> {
        if path.extension().is_some_and(|extension| extension == "sx") {
            Some(&SexpGrammar)
        } else {
            None
        }
    }
}

enum Entry {
    Nodes(Vec<Node>),
    Text(String),
}

struct Reader<'s> {
    source: &'s str,
    index: &'s LineIndex,
    pos: usize,
}

impl<'s> Reader<'s> {
    const fn new(source: &'s str, index: &'s LineIndex) -> Self {
        Self {
            source,
            index,
            pos: 0,
        }
    }

    fn items(mut self) -> Result<Vec<Node>, ParseFailure> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Ok(items),
                Some(')') => return Err(self.error_at(self.pos)),
                Some(_) => items.push(self.node()?),
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos..)?.chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek().filter(|ch| ch.is_whitespace()) {
            self.pos += ch.len_utf8();
        }
    }

    fn word(&mut self) -> (&'s str, usize) {
        let start = self.pos;
        while let Some(ch) = self
            .peek()
            .filter(|ch| !ch.is_whitespace() && *ch != '(' && *ch != ')')
        {
            self.pos += ch.len_utf8();
        }
        (self.source.get(start..self.pos).unwrap_or_default(), start)
    }

    fn node(&mut self) -> Result<Node, ParseFailure> {
        if self.peek() == Some('(') {
            return self.list();
        }
        let (word, start) = self.word();
        self.atom(word, start)
    }

    fn atom(&self, word: &str, start: usize) -> Result<Node, ParseFailure> {
        match word.split_once(':') {
            Some((kind, text)) if !kind.is_empty() => Ok(Node::leaf(
                kind,
                text,
                self.index.span(start, start + word.len()),
            )),
            _ => Err(self.error_at(start)),
        }
    }

    fn list(&mut self) -> Result<Node, ParseFailure> {
        let start = self.pos;
        self.pos += 1;
        let (kind, kind_start) = self.word();
        if kind.is_empty() {
            return Err(self.error_at(kind_start));
        }

        let mut entries: Vec<(String, Entry)> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error_at(start)),
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some('(') => {
                    let child = self.list()?;
                    add_node(&mut entries, CHILDREN_KEY, child);
                }
                Some(_) => {
                    let (word, word_start) = self.word();
                    match split_key(word) {
                        Some((key, "")) => {
                            let child = self.node()?;
                            add_node(&mut entries, key, child);
                        }
                        Some((key, value)) if value.contains(':') => {
                            let child = self.atom(value, word_start + key.len() + 1)?;
                            add_node(&mut entries, key, child);
                        }
                        Some((key, value)) => {
                            entries.push((key.to_owned(), Entry::Text(value.to_owned())));
                        }
                        None => {
                            let child = self.atom(word, word_start)?;
                            add_node(&mut entries, CHILDREN_KEY, child);
                        }
                    }
                }
            }
        }

        let mut node = Node::new(kind, self.index.span(start, self.pos));
        for (key, entry) in entries {
            let field = match entry {
                Entry::Text(text) => Field::Text(text),
                Entry::Nodes(mut nodes) if key != CHILDREN_KEY && nodes.len() == 1 => {
                    Field::Node(Box::new(nodes.remove(0)))
                }
                Entry::Nodes(nodes) => Field::List(nodes),
            };
            node.push_field(key, field);
        }
        Ok(node)
    }

    fn error_at(&self, offset: usize) -> ParseFailure {
        let position = self.index.position(offset);
        let context: String = self
            .source
            .get(offset..)
            .unwrap_or_default()
            .chars()
            .take(12)
            .collect();
        ParseFailure::syntax(position.line + 1, position.column + 1, context)
    }
}

fn split_key(word: &str) -> Option<(&str, &str)> {
    let (key, value) = word.split_once('=')?;
    (!key.is_empty() && !key.contains(':')).then_some((key, value))
}

fn add_node(entries: &mut Vec<(String, Entry)>, key: &str, node: Node) {
    match entries.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, Entry::Nodes(nodes))) => nodes.push(node),
        _ => entries.push((key.to_owned(), Entry::Nodes(vec![node]))),
    }
}

/// Parses a whole file, wrapped in a `program` root.
pub(crate) fn file_root(source: &str) -> Node {
    SexpGrammar
        .parse_file(source, ParseLimits::default())
        .unwrap_or_else(|error| panic!("file should parse: {error}"))
}

/// Parses exactly one node, as it would appear in a file.
pub(crate) fn file_node(source: &str) -> Node {
    single_node(source)
}

/// Parses exactly one node, as it would appear in a query.
pub(crate) fn query_node(source: &str) -> Node {
    single_node(source)
}

fn single_node(source: &str) -> Node {
    let mut nodes = SexpGrammar
        .parse_query(source)
        .unwrap_or_else(|error| panic!("snippet should parse: {error}"));
    assert_eq!(nodes.len(), 1, "expected one node in {source}");
    nodes.remove(0)
}

/// Prepares a query with [`SexpGrammar`].
pub(crate) fn prepared(source: &str, case: CaseSensitivity) -> Query {
    Query::prepare(0, source, &SexpGrammar, case)
        .unwrap_or_else(|error| panic!("query should prepare: {error}"))
}
