//! The token type produced by the scanning engine.

use std::fmt;
use std::hash::Hash;

use compact_str::CompactString;

use crate::text::TextRange;

/// Marker trait for user-defined token kinds.
///
/// Any `Copy + Eq + Hash + Debug` type qualifies; a fieldless enum is the
/// usual choice. `&'static str` works too when kinds are only names.
pub trait TokenKind: Copy + Eq + Hash + fmt::Debug {}

impl<T: Copy + Eq + Hash + fmt::Debug> TokenKind for T {}

/// A token produced by the scanner: the winning pattern's kind, the lexeme
/// text, and the character span it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<K: TokenKind> {
    /// The kind registered with the pattern that won this match.
    pub kind: K,
    /// The matched lexeme.
    pub text: CompactString,
    /// Character span of the lexeme in the scanned input.
    pub range: TextRange,
}

impl<K: TokenKind> Token<K> {
    #[must_use]
    pub fn new(kind: K, text: impl Into<CompactString>, range: TextRange) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
        }
    }

    /// Lexeme length in characters.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.range.len().raw()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl<K: TokenKind> fmt::Display for Token<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{TextRange, TextSize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Word,
    }

    #[test]
    fn token_basics() {
        let token = Token::new(
            Kind::Word,
            "ab",
            TextRange::at(TextSize::from(3), TextSize::from(2)),
        );
        assert_eq!(token.kind, Kind::Word);
        assert_eq!(token.text, "ab");
        assert_eq!(token.len(), 2);
        assert!(!token.is_empty());
        assert_eq!(token.to_string(), "Word(\"ab\")");
    }
}
