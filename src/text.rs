//! Position primitives for lexeme spans and error locations.

use std::fmt;

/// Offset into the scanned input, counted in characters.
///
/// Uses `u32`, which is sufficient for all practical inputs. Conversions to
/// `usize` for indexing are safe on all supported platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextSize(u32);

impl TextSize {
    #[must_use]
    pub const fn from(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Half-open span `[start, end)` over the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    start: TextSize,
    end: TextSize,
}

impl TextRange {
    #[must_use]
    pub const fn new(start: TextSize, end: TextSize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn at(start: TextSize, len: TextSize) -> Self {
        Self::new(start, TextSize(start.0 + len.0))
    }

    #[must_use]
    pub const fn start(self) -> TextSize {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> TextSize {
        self.end
    }

    #[must_use]
    pub const fn len(self) -> TextSize {
        TextSize(self.end.0 - self.start.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.0, self.end.0)
    }
}

/// A line and column position in the scanned input.
///
/// Both components are 1-based, matching how positions are reported in
/// lexical errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_accessors() {
        let range = TextRange::at(TextSize::from(2), TextSize::from(3));
        assert_eq!(range.start(), TextSize::from(2));
        assert_eq!(range.end(), TextSize::from(5));
        assert_eq!(range.len(), TextSize::from(3));
        assert!(!range.is_empty());
    }

    #[test]
    fn empty_range() {
        let range = TextRange::new(TextSize::from(4), TextSize::from(4));
        assert!(range.is_empty());
        assert_eq!(range.len(), TextSize::zero());
    }

    #[test]
    fn display() {
        let range = TextRange::new(TextSize::from(1), TextSize::from(4));
        assert_eq!(range.to_string(), "1..4");
        assert_eq!(LineCol::new(2, 7).to_string(), "line 2, column 7");
    }
}
