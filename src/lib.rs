//! A lexical-analyzer generator built on classic automata theory.
//!
//! Rules pair a regular expression with a token kind and a priority. At
//! compile time each pattern is preprocessed into postfix form, turned
//! into an NFA by Thompson construction, combined with the other rules,
//! determinized by subset construction, and minimized. The compiled
//! automaton then drives a maximal-munch scanner: the longest matching
//! prefix wins, with priority (then registration order) breaking ties
//! between patterns that match the same lexeme.
//!
//! Supported pattern syntax: single-character operands, `|`, `*`, `+`,
//! `?`, grouping with parentheses, and implicit concatenation. Whitespace
//! characters are ordinary operands.
//!
//! ```
//! use relex::LexerBuilder;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind {
//!     Word,
//!     Number,
//!     Space,
//! }
//!
//! let lexer = LexerBuilder::new()
//!     .rule(Kind::Word, "(a|b|c)+", 1)
//!     .rule(Kind::Number, "(0|1)+", 1)
//!     .rule(Kind::Space, " +", 1)
//!     .compile()?;
//!
//! let tokens = lexer.scanner("abc 01").tokenize()?;
//! let kinds: Vec<Kind> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(kinds, [Kind::Word, Kind::Space, Kind::Number]);
//! assert_eq!(tokens[2].text, "01");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The compiled lexer is immutable and can be shared across threads; each
//! call to [`CompiledLexer::scanner`] starts an independent scan.

pub mod buffer;
pub mod builder;
pub mod dfa;
pub mod error;
pub mod minimize;
pub mod nfa;
pub mod postfix;
pub mod scanner;
pub mod text;
pub mod token;

pub use builder::{CompiledLexer, LexerBuilder, PriorityWarning};
pub use error::{CompileError, LexicalError, PatternError};
pub use scanner::Lexer;
pub use token::{Token, TokenKind};
