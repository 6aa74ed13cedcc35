//! Character source consumed by the scanner.
//!
//! The buffer owns the decoded input and exposes the contract the scanner
//! needs: peek/take at a cursor, a single lexeme mark, extraction of the
//! marked span, and rollback to a previously observed cursor. Line and
//! column positions are derived on demand; they are only needed when a
//! scan fails.

use std::io;

use compact_str::CompactString;

use crate::text::LineCol;

/// An opaque position in the buffer, valid for rollback as long as the
/// buffer lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(pub(crate) usize);

impl Cursor {
    /// Character offset from the start of the input.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0
    }
}

/// A character stream with one live lexeme span at a time.
#[derive(Debug, Clone)]
pub struct Buffer {
    chars: Vec<char>,
    pos: usize,
    mark: Option<usize>,
}

impl Buffer {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            mark: None,
        }
    }

    /// Read the whole source into a buffer.
    ///
    /// # Errors
    ///
    /// Fails if reading fails or the bytes are not valid UTF-8; storage
    /// errors surface here and never during scanning.
    pub fn from_reader(mut reader: impl io::Read) -> io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::new(&text))
    }

    /// The next character, without consuming it. `None` is end of input,
    /// distinct from every real symbol.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Consume and return the next character.
    pub fn take(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor(self.pos)
    }

    /// Move the cursor back to a previously observed position.
    pub fn rollback(&mut self, cursor: Cursor) {
        debug_assert!(cursor.0 <= self.chars.len());
        self.pos = cursor.0;
    }

    /// Begin a lexeme at the current cursor, replacing any previous mark.
    pub fn mark_lexeme_start(&mut self) {
        self.mark = Some(self.pos);
    }

    /// Text consumed since the mark, clearing the mark. `None` if no mark
    /// is set.
    pub fn take_lexeme(&mut self) -> Option<CompactString> {
        let start = self.mark.take()?;
        Some(self.chars[start..self.pos].iter().collect())
    }

    /// 1-based line and column of a cursor, by scanning the input up to it.
    #[must_use]
    pub fn line_col(&self, cursor: Cursor) -> LineCol {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..cursor.0.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        LineCol::new(line, column)
    }
}
