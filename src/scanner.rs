//! The maximal-munch scanning engine.
//!
//! A [`Lexer`] walks the compiled automaton over a [`Buffer`], always
//! preferring the longest prefix that lands on an accepting state. When a
//! longer attempt dead-ends, it rolls back to the most recent accepting
//! position; the rejecting character is left in the buffer for the next
//! call. Zero-length matches are never produced: acceptance is only
//! recorded after at least one character has been consumed, so nullable
//! patterns cannot stall the scan.

use crate::buffer::{Buffer, Cursor};
use crate::builder::CompiledLexer;
use crate::error::LexicalError;
use crate::nfa::AcceptInfo;
use crate::text::{TextRange, TextSize};
use crate::token::{Token, TokenKind};

/// One scan in progress over one input.
///
/// Borrows the compiled automaton read-only; any number of scanners can
/// share a [`CompiledLexer`], including from different threads.
#[derive(Debug)]
pub struct Lexer<'a, K: TokenKind> {
    compiled: &'a CompiledLexer<K>,
    buffer: Buffer,
    /// Set once a scan fails; the iterator fuses on it.
    failed: bool,
}

impl<'a, K: TokenKind> Lexer<'a, K> {
    pub(crate) fn new(compiled: &'a CompiledLexer<K>, buffer: Buffer) -> Self {
        Self {
            compiled,
            buffer,
            failed: false,
        }
    }

    /// Extract the next token, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`LexicalError`] when the automaton cannot move past the
    /// next character and the current attempt has no accepting state to
    /// fall back to. The error is fatal to this scan.
    pub fn next_token(&mut self) -> Result<Option<Token<K>>, LexicalError> {
        let dfa = self.compiled.dfa();
        let mut state = dfa.start();
        self.buffer.mark_lexeme_start();
        let start = self.buffer.cursor();
        let mut last_final: Option<(AcceptInfo, Cursor)> = None;

        loop {
            let Some(symbol) = self.buffer.peek() else {
                break;
            };
            let Some(next) = dfa.transition(state, symbol) else {
                if last_final.is_none() {
                    self.failed = true;
                    let at = self.buffer.line_col(self.buffer.cursor());
                    return Err(LexicalError {
                        offset: u32::try_from(self.buffer.cursor().offset()).unwrap_or(0),
                        line: at.line,
                        column: at.column,
                        found: symbol,
                    });
                }
                // Rejecting character stays for the next call.
                break;
            };
            self.buffer.take();
            state = next;
            if let Some(info) = dfa.accept_info(state) {
                last_final = Some((info, self.buffer.cursor()));
            }
        }

        let Some((info, end)) = last_final else {
            // End of input, possibly after a partial attempt.
            return Ok(None);
        };

        self.buffer.rollback(end);
        let Some(text) = self.buffer.take_lexeme() else {
            unreachable!("lexeme mark set at scan start");
        };
        let range = TextRange::new(
            TextSize::from(u32::try_from(start.offset()).unwrap_or(0)),
            TextSize::from(u32::try_from(end.offset()).unwrap_or(0)),
        );
        Ok(Some(Token::new(self.compiled.kind_of(info), text, range)))
    }

    /// Drain the whole input into a token vector.
    ///
    /// # Errors
    ///
    /// Stops at the first [`LexicalError`]; tokens extracted before the
    /// failure are discarded.
    pub fn tokenize(mut self) -> Result<Vec<Token<K>>, LexicalError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Iterator view: yields `Ok(token)` per match, then one `Err` on a scan
/// failure, after which the iterator is fused.
impl<K: TokenKind> Iterator for Lexer<'_, K> {
    type Item = Result<Token<K>, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.next_token().transpose()
    }
}
