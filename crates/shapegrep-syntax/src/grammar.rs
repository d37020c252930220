//! [`Grammar`] implementations backed by Tree-sitter.

use std::borrow::Cow;
use std::path::Path;

use shapegrep_core::{Field, Grammar, GrammarSet, Node, ParseFailure, ParseLimits};
use tracing::debug;

use crate::convert::Converter;
use crate::language::SupportedLanguage;
use crate::parser::Parser;
use crate::placeholder;

/// Node kinds with special meaning to the matcher.
struct KindTable {
    identifiers: &'static [&'static str],
    strings: &'static [&'static str],
    numerics: &'static [&'static str],
    blocks: &'static [&'static str],
    statement_wrappers: &'static [&'static str],
}

const TYPESCRIPT_KINDS: KindTable = KindTable {
    identifiers: &[
        "identifier",
        "property_identifier",
        "private_property_identifier",
        "shorthand_property_identifier",
        "shorthand_property_identifier_pattern",
        "statement_identifier",
        "type_identifier",
    ],
    strings: &["string", "template_string"],
    numerics: &["number"],
    blocks: &["program", "statement_block", "class_body"],
    statement_wrappers: &["expression_statement"],
};

const PYTHON_KINDS: KindTable = KindTable {
    identifiers: &["identifier"],
    strings: &["string"],
    numerics: &["integer", "float"],
    blocks: &["module", "block"],
    statement_wrappers: &["expression_statement"],
};

const RUST_KINDS: KindTable = KindTable {
    identifiers: &[
        "identifier",
        "field_identifier",
        "type_identifier",
        "shorthand_field_identifier",
        "primitive_type",
    ],
    strings: &["string_literal", "raw_string_literal", "char_literal"],
    numerics: &["integer_literal", "float_literal"],
    blocks: &["source_file", "block", "declaration_list"],
    statement_wrappers: &["expression_statement"],
};

/// A [`Grammar`] for one [`SupportedLanguage`].
pub struct TreeSitterGrammar {
    language: SupportedLanguage,
    kinds: &'static KindTable,
}

impl TreeSitterGrammar {
    /// Creates the grammar for `language`.
    #[must_use]
    pub const fn new(language: SupportedLanguage) -> Self {
        let kinds = match language {
            SupportedLanguage::TypeScript | SupportedLanguage::Tsx => &TYPESCRIPT_KINDS,
            SupportedLanguage::Python => &PYTHON_KINDS,
            SupportedLanguage::Rust => &RUST_KINDS,
        };
        Self { language, kinds }
    }

    /// Returns the language this grammar parses.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    fn converter<'s>(&self, source: &'s str) -> Converter<'s> {
        Converter::new(source, self.kinds.strings)
    }

    fn parse_wrapped(&self, parser: &mut Parser, query: &str) -> Result<Vec<Node>, ParseFailure> {
        let wrapped = wrap_for_parse(self.language, query);
        let tree = parser.parse(&wrapped, None)?;
        let root = self
            .converter(&wrapped)
            .restoring_placeholders(self.language.needs_placeholders())
            .convert(tree.root_node());

        let body = root
            .children()
            .first()
            .and_then(|function| function.field("body"))
            .and_then(|body| match body {
                Field::Node(block) => Some(block.children().to_vec()),
                Field::List(_) | Field::Text(_) => None,
            });
        body.ok_or_else(|| ParseFailure::unavailable("wrapped query lost its function body"))
    }
}

impl Grammar for TreeSitterGrammar {
    fn name(&self) -> &str {
        self.language.as_str()
    }

    fn parse_file(&self, source: &str, limits: ParseLimits) -> Result<Node, ParseFailure> {
        let mut parser = Parser::new(self.language)?;
        let tree = parser.parse(source, limits.timeout)?;
        Ok(self.converter(source).convert(tree.root_node()))
    }

    fn parse_query(&self, source: &str) -> Result<Vec<Node>, ParseFailure> {
        let query = if self.language.needs_placeholders() {
            placeholder::disguise(source)
        } else {
            Cow::Borrowed(source)
        };

        let mut parser = Parser::new(self.language)?;
        match parser.parse(&query, None) {
            Ok(tree) => {
                let root = self
                    .converter(&query)
                    .restoring_placeholders(self.language.needs_placeholders())
                    .convert(tree.root_node());
                Ok(root.children().to_vec())
            }
            Err(direct @ ParseFailure::Syntax { .. }) => {
                debug!(language = %self.language, "retrying query inside a function body");
                self.parse_wrapped(&mut parser, &query).map_err(|_| direct)
            }
            Err(other) => Err(other),
        }
    }

    fn is_identifier_kind(&self, kind: &str) -> bool {
        self.kinds.identifiers.contains(&kind)
    }

    fn is_string_kind(&self, kind: &str) -> bool {
        self.kinds.strings.contains(&kind)
    }

    fn is_numeric_kind(&self, kind: &str) -> bool {
        self.kinds.numerics.contains(&kind)
    }

    fn is_block_kind(&self, kind: &str) -> bool {
        self.kinds.blocks.contains(&kind)
    }

    fn is_statement_wrapper(&self, kind: &str) -> bool {
        self.kinds.statement_wrappers.contains(&kind)
    }
}

/// Embeds a query fragment in a function body so statement-level snippets
/// parse in grammars that only accept items at the top level.
fn wrap_for_parse(language: SupportedLanguage, query: &str) -> String {
    match language {
        SupportedLanguage::Rust => {
            let trimmed = query.trim_end();
            let needs_semicolon =
                !trimmed.is_empty() && !trimmed.ends_with(';') && !trimmed.ends_with('}');
            let statement = if needs_semicolon {
                format!("{trimmed};")
            } else {
                trimmed.to_owned()
            };
            format!("fn __shapegrep_query__() {{ {statement} }}")
        }
        SupportedLanguage::Python => {
            let mut out = String::from("def __shapegrep_query__():\n");
            for line in query.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
            out
        }
        SupportedLanguage::TypeScript | SupportedLanguage::Tsx => {
            format!("function __shapegrep_query__() {{ {query} }}")
        }
    }
}

/// Serves a [`TreeSitterGrammar`] for every file extension shapegrep knows.
pub struct LanguageRegistry {
    grammars: Vec<TreeSitterGrammar>,
}

impl LanguageRegistry {
    /// Creates a registry covering [`SupportedLanguage::all`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            grammars: SupportedLanguage::all()
                .iter()
                .map(|language| TreeSitterGrammar::new(*language))
                .collect(),
        }
    }

    /// Returns the grammar for `language`.
    #[must_use]
    pub fn grammar(&self, language: SupportedLanguage) -> Option<&TreeSitterGrammar> {
        self.grammars
            .iter()
            .find(|grammar| grammar.language() == language)
    }

    /// Returns whether `path` has an extension with a registered grammar.
    #[must_use]
    pub fn supports(&self, path: &Path) -> bool {
        self.grammar_for(path).is_some()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarSet for LanguageRegistry {
    fn grammar_for(&self, path: &Path) -> Option<&dyn Grammar> {
        let language = SupportedLanguage::from_path(path)?;
        self.grammar(language).map(|grammar| grammar as &dyn Grammar)
    }
}
