//! Rule registration and the compile pipeline.
//!
//! [`LexerBuilder`] collects `(kind, pattern, priority)` rules, then
//! [`compile`](LexerBuilder::compile) runs the whole pipeline: each pattern
//! is preprocessed to postfix, compiled to an NFA fragment, the fragments
//! are merged under one start state, the combined machine is determinized,
//! and the result minimized. The output is a [`CompiledLexer`], an
//! immutable artifact that can hand out any number of scanners.

use std::io;

use compact_str::CompactString;
use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::buffer::Buffer;
use crate::dfa::{self, Dfa};
use crate::error::CompileError;
use crate::minimize;
use crate::nfa::{AcceptInfo, Nfa};
use crate::postfix;
use crate::scanner::Lexer;
use crate::token::TokenKind;

/// A registered rule, in registration order.
#[derive(Debug, Clone)]
struct LexRule<K> {
    kind: K,
    pattern: CompactString,
    priority: i32,
}

/// An exact-priority tie between two rules, reported per overlapping
/// pattern pair. The tie is resolved in favor of `winner`, the rule
/// registered first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityWarning<K: TokenKind> {
    pub winner: K,
    pub loser: K,
    pub priority: i32,
}

/// Collects lexer rules for compilation.
///
/// Registration order matters twice: it breaks exact-priority ties (the
/// earlier rule wins) and it is the order rule indices are assigned in.
#[derive(Debug, Clone)]
pub struct LexerBuilder<K: TokenKind> {
    rules: SmallVec<[LexRule<K>; 16]>,
}

impl<K: TokenKind> Default for LexerBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TokenKind> LexerBuilder<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: SmallVec::new(),
        }
    }

    /// Register a rule. Higher `priority` wins when two patterns accept the
    /// same lexeme.
    #[must_use]
    pub fn rule(mut self, kind: K, pattern: impl Into<CompactString>, priority: i32) -> Self {
        self.rules.push(LexRule {
            kind,
            pattern: pattern.into(),
            priority,
        });
        self
    }

    /// Compile all registered rules into a scanner-ready automaton.
    ///
    /// # Errors
    ///
    /// Fails if no rules were registered or any pattern is malformed. No
    /// partial automaton is ever returned.
    pub fn compile(self) -> Result<CompiledLexer<K>, CompileError> {
        if self.rules.is_empty() {
            return Err(CompileError::NoRules);
        }

        let mut nfa = Nfa::new();
        let mut starts = Vec::with_capacity(self.rules.len());
        let mut alphabet = Vec::new();
        let mut kinds = Vec::with_capacity(self.rules.len());

        for (index, rule) in self.rules.iter().enumerate() {
            let program =
                postfix::prepare(&rule.pattern).map_err(|source| CompileError::Pattern {
                    pattern: rule.pattern.clone(),
                    source,
                })?;
            let fragment = nfa.compile(&program)?;
            nfa.set_accept(
                fragment.end,
                AcceptInfo {
                    priority: rule.priority,
                    rule: u32::try_from(index).unwrap_or(0),
                },
            );
            starts.push(fragment.start);
            alphabet.extend_from_slice(program.alphabet());
            kinds.push(rule.kind);
        }

        nfa.merge_starts(&starts);
        nfa.set_alphabet(alphabet);

        let (raw, ambiguities) = dfa::determinize(&nfa);
        let dfa = minimize::minimize(&raw);
        log::debug!(
            "compiled {} rules: {} NFA states, {} DFA states, {} after minimization",
            self.rules.len(),
            nfa.state_count(),
            raw.state_count(),
            dfa.state_count()
        );

        // The same rule pair can tie on several composite states; report
        // each pair once.
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut warnings = Vec::new();
        for ambiguity in ambiguities {
            if !seen.insert((ambiguity.winner, ambiguity.loser)) {
                continue;
            }
            let warning = PriorityWarning {
                winner: self.rules[ambiguity.winner as usize].kind,
                loser: self.rules[ambiguity.loser as usize].kind,
                priority: ambiguity.priority,
            };
            log::warn!(
                "patterns for {:?} and {:?} overlap at priority {}; {:?} wins (registered first)",
                warning.winner,
                warning.loser,
                warning.priority,
                warning.winner
            );
            warnings.push(warning);
        }

        Ok(CompiledLexer {
            dfa,
            kinds,
            warnings,
        })
    }
}

/// The compiled, immutable automaton plus the rule-index-to-kind table.
///
/// Shared freely across threads; every scanner borrows it read-only.
#[derive(Debug, Clone)]
pub struct CompiledLexer<K: TokenKind> {
    dfa: Dfa,
    kinds: Vec<K>,
    warnings: Vec<PriorityWarning<K>>,
}

impl<K: TokenKind> CompiledLexer<K> {
    /// Start scanning an in-memory string.
    #[must_use]
    pub fn scanner(&self, input: &str) -> Lexer<'_, K> {
        Lexer::new(self, Buffer::new(input))
    }

    /// Start scanning from a reader; the whole source is read up front.
    ///
    /// # Errors
    ///
    /// Fails if reading fails or the source is not valid UTF-8.
    pub fn scan_reader(&self, reader: impl io::Read) -> io::Result<Lexer<'_, K>> {
        Ok(Lexer::new(self, Buffer::from_reader(reader)?))
    }

    /// The minimized automaton backing this lexer.
    #[must_use]
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// Priority ties detected at compile time, one per overlapping pair.
    #[must_use]
    pub fn warnings(&self) -> &[PriorityWarning<K>] {
        &self.warnings
    }

    pub(crate) fn kind_of(&self, info: AcceptInfo) -> K {
        self.kinds[info.rule as usize]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        A,
        B,
    }

    #[test]
    fn empty_builder_is_rejected() {
        let result = LexerBuilder::<Kind>::new().compile();
        assert_eq!(result.unwrap_err(), CompileError::NoRules);
    }

    #[test]
    fn bad_pattern_names_the_offender() {
        let err = LexerBuilder::new()
            .rule(Kind::A, "ab", 1)
            .rule(Kind::B, "(cd", 1)
            .compile()
            .unwrap_err();
        match err {
            CompileError::Pattern { pattern, source } => {
                assert_eq!(pattern, "(cd");
                assert_eq!(source, crate::error::PatternError::UnclosedParen);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn tie_warning_carries_kinds() {
        let compiled = LexerBuilder::new()
            .rule(Kind::A, "x", 3)
            .rule(Kind::B, "x", 3)
            .compile()
            .unwrap();
        assert_eq!(
            compiled.warnings(),
            [PriorityWarning {
                winner: Kind::A,
                loser: Kind::B,
                priority: 3
            }]
        );
    }

    #[test]
    fn distinct_priorities_warn_nothing() {
        let compiled = LexerBuilder::new()
            .rule(Kind::A, "x", 2)
            .rule(Kind::B, "x", 1)
            .compile()
            .unwrap();
        assert!(compiled.warnings().is_empty());
    }

    #[test]
    fn compile_is_deterministic() {
        let build = || {
            LexerBuilder::new()
                .rule(Kind::A, "(a|b)+", 1)
                .rule(Kind::B, "abb", 2)
                .compile()
                .unwrap()
        };
        let first = build();
        let second = build();
        assert_eq!(first.dfa().state_count(), second.dfa().state_count());
        for (s1, s2) in first.dfa().states().zip(second.dfa().states()) {
            let e1: Vec<_> = first.dfa().edges(s1).collect();
            let e2: Vec<_> = second.dfa().edges(s2).collect();
            assert_eq!(e1, e2);
        }
    }
}
