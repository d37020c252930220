//! Tree-sitter grammars for shapegrep.
//!
//! This crate adapts Tree-sitter parsers to the [`shapegrep_core::Grammar`]
//! contract: it parses files and query snippets, lowers the concrete syntax
//! trees into [`shapegrep_core::Node`] values and tells the matcher which
//! node kinds are identifiers, strings, numbers, statement blocks and
//! expression-statement wrappers.
//!
//! # Supported Languages
//!
//! - TypeScript (`.ts`, `.mts`, `.cts`)
//! - TSX and JavaScript (`.tsx`, `.js`, `.jsx`, `.mjs`, `.cjs`)
//! - Python (`.py`, `.pyi`)
//! - Rust (`.rs`)
//!
//! # Example
//!
//! ```ignore
//! use shapegrep_core::{CancellationToken, SearchSettings, search};
//! use shapegrep_syntax::LanguageRegistry;
//!
//! let registry = LanguageRegistry::new();
//! let results = search(
//!     &registry,
//!     &[String::from("useState($$$)")],
//!     &paths,
//!     &SearchSettings::default(),
//!     &CancellationToken::new(),
//! );
//! ```

mod convert;
mod error;
mod grammar;
mod language;
mod parser;
mod placeholder;

pub use error::SyntaxError;
pub use grammar::{LanguageRegistry, TreeSitterGrammar};
pub use language::SupportedLanguage;
pub use parser::Parser;
