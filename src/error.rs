//! Error types for pattern compilation and scanning.
//!
//! The taxonomy separates the two phases of the pipeline:
//!
//! - [`PatternError`]: a single pattern is malformed (bad grouping, operator
//!   with nothing to apply to). Detected during preprocessing.
//! - [`CompileError`]: the whole compile aborts. Wraps a [`PatternError`]
//!   with the offending pattern, or reports an internal postfix-program
//!   inconsistency. No partial automaton is ever returned.
//! - [`LexicalError`]: the scanner hit a character it cannot extend past
//!   with no accepting state in its history. Fatal to the scan; carries the
//!   exact position.
//!
//! Priority ties between patterns are not errors; they resolve
//! deterministically (first registered wins) and are surfaced as warnings on
//! the compiled lexer.

use compact_str::CompactString;
use thiserror::Error;

/// A single regular expression failed preprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `)` with no matching `(`.
    #[error("unmatched ')'")]
    UnmatchedParen,

    /// A `(` that is never closed.
    #[error("unclosed '('")]
    UnclosedParen,

    /// The pattern (or a group inside it) matches nothing at all.
    #[error("empty pattern")]
    EmptyPattern,

    /// An operator without enough operands, e.g. a leading `|` or `*`.
    #[error("operator '{op}' is missing an operand")]
    MissingOperand { op: char },
}

/// Compiling the rule set into an automaton failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// One of the registered patterns is malformed.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: CompactString,
        #[source]
        source: PatternError,
    },

    /// The NFA builder's fragment stack underflowed or finished with more
    /// than one fragment. Unreachable for programs produced by the
    /// preprocessor; checked defensively.
    #[error("malformed postfix program: fragment stack invariant violated")]
    MalformedPostfix,

    /// `compile()` was called with no rules registered.
    #[error("no lexer rules registered")]
    NoRules,
}

/// The scanner found a character it cannot accept.
///
/// Raised only when the current recognition attempt has no accepting state
/// to fall back to; a mere dead end after a match rolls back instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected character '{found}' at line {line}, column {column}")]
pub struct LexicalError {
    /// Character offset of the rejected character.
    pub offset: u32,
    /// 1-based line of the rejected character.
    pub line: u32,
    /// 1-based column of the rejected character.
    pub column: u32,
    /// The rejected character itself.
    pub found: char,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_error_display() {
        assert_eq!(PatternError::UnmatchedParen.to_string(), "unmatched ')'");
        assert_eq!(
            PatternError::MissingOperand { op: '|' }.to_string(),
            "operator '|' is missing an operand"
        );
    }

    #[test]
    fn compile_error_carries_pattern() {
        let err = CompileError::Pattern {
            pattern: CompactString::from("(ab"),
            source: PatternError::UnclosedParen,
        };
        assert_eq!(err.to_string(), "invalid pattern `(ab`: unclosed '('");
    }

    #[test]
    fn lexical_error_display() {
        let err = LexicalError {
            offset: 9,
            line: 2,
            column: 4,
            found: '#',
        };
        assert_eq!(
            err.to_string(),
            "unexpected character '#' at line 2, column 4"
        );
    }
}
