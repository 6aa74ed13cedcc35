//! Regex preprocessing: explicit concatenation and infix-to-postfix
//! conversion.
//!
//! Pattern syntax is deliberately small: `(` `)` `|` `*` `+` `?` are
//! operators, every other character is an operand. Concatenation is
//! implicit in the written pattern and made explicit here, so the rest of
//! the pipeline only ever sees a typed postfix program. Working with typed
//! atoms (rather than re-encoding the program as a string) means no
//! character can collide with an internal operator marker.
//!
//! [`prepare`] is the entry point: it tokenizes a pattern, inserts the
//! concatenation operator, converts to postfix via an operator-precedence
//! stack, and collects the pattern's alphabet.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::PatternError;

/// One atom of a postfix program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    /// A literal input symbol.
    Symbol(char),
    /// Binary concatenation.
    Concat,
    /// Binary alternation `|`.
    Union,
    /// Kleene star `*`.
    Star,
    /// One-or-more `+`.
    Plus,
    /// Optional `?`.
    Question,
}

impl PostfixOp {
    /// The character this operator would render as, `^` standing for
    /// concatenation.
    const fn as_char(self) -> char {
        match self {
            Self::Symbol(c) => c,
            Self::Concat => '^',
            Self::Union => '|',
            Self::Star => '*',
            Self::Plus => '+',
            Self::Question => '?',
        }
    }
}

/// A preprocessed pattern: postfix atoms plus the symbols it mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostfixProgram {
    pub(crate) ops: Vec<PostfixOp>,
    pub(crate) alphabet: Vec<char>,
}

impl PostfixProgram {
    #[must_use]
    pub fn ops(&self) -> &[PostfixOp] {
        &self.ops
    }

    /// Symbols this pattern can consume, sorted and deduplicated.
    #[must_use]
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }
}

impl fmt::Display for PostfixProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{}", op.as_char())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InfixToken {
    Symbol(char),
    LParen,
    RParen,
    Union,
    Concat,
    Star,
    Plus,
    Question,
}

impl InfixToken {
    /// Operator precedence: alternation < concatenation < postfix unary.
    /// Parentheses sit below everything so they are never popped by
    /// precedence comparison.
    const fn precedence(self) -> u8 {
        match self {
            Self::LParen | Self::RParen => 0,
            Self::Union => 2,
            Self::Concat => 4,
            Self::Star | Self::Plus | Self::Question => 8,
            Self::Symbol(_) => unreachable!(),
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::Symbol(c) => c,
            Self::LParen => '(',
            Self::RParen => ')',
            Self::Union => '|',
            Self::Concat => '^',
            Self::Star => '*',
            Self::Plus => '+',
            Self::Question => '?',
        }
    }
}

fn scan(pattern: &str) -> Vec<InfixToken> {
    pattern
        .chars()
        .map(|c| match c {
            '(' => InfixToken::LParen,
            ')' => InfixToken::RParen,
            '|' => InfixToken::Union,
            '*' => InfixToken::Star,
            '+' => InfixToken::Plus,
            '?' => InfixToken::Question,
            c => InfixToken::Symbol(c),
        })
        .collect()
}

/// Insert the explicit concatenation operator between adjacent tokens
/// `A B` where `A` is an operand or a left-joining unary operator
/// (`*`, `+`, `?`, `)`) and `B` is an operand or `(`.
pub(crate) fn insert_concat(tokens: &[InfixToken]) -> Vec<InfixToken> {
    use InfixToken::{Concat, LParen, Plus, Question, RParen, Star, Symbol};

    let joins_left = |t: &InfixToken| matches!(t, Symbol(_) | Star | Plus | Question | RParen);
    let joins_right = |t: &InfixToken| matches!(t, Symbol(_) | LParen);

    let mut out = Vec::with_capacity(tokens.len() * 2);
    for (i, &tok) in tokens.iter().enumerate() {
        out.push(tok);
        if let Some(next) = tokens.get(i + 1) {
            if joins_left(&tok) && joins_right(next) {
                out.push(Concat);
            }
        }
    }
    out
}

/// Operator-precedence conversion to postfix, collecting the alphabet.
pub(crate) fn to_postfix(tokens: &[InfixToken]) -> Result<PostfixProgram, PatternError> {
    let mut ops = Vec::with_capacity(tokens.len());
    let mut stack: Vec<InfixToken> = Vec::new();
    let mut alphabet = BTreeSet::new();

    for &tok in tokens {
        match tok {
            InfixToken::Symbol(c) => {
                ops.push(PostfixOp::Symbol(c));
                alphabet.insert(c);
            }
            InfixToken::LParen => stack.push(tok),
            InfixToken::RParen => loop {
                match stack.pop() {
                    Some(InfixToken::LParen) => break,
                    Some(op) => ops.push(postfix_op(op)),
                    None => return Err(PatternError::UnmatchedParen),
                }
            },
            op => {
                while let Some(&top) = stack.last() {
                    if top != InfixToken::LParen && top.precedence() >= op.precedence() {
                        ops.push(postfix_op(top));
                        stack.pop();
                    } else {
                        break;
                    }
                }
                stack.push(op);
            }
        }
    }

    while let Some(op) = stack.pop() {
        if op == InfixToken::LParen {
            return Err(PatternError::UnclosedParen);
        }
        ops.push(postfix_op(op));
    }

    validate(&ops)?;
    Ok(PostfixProgram {
        ops,
        alphabet: alphabet.into_iter().collect(),
    })
}

fn postfix_op(tok: InfixToken) -> PostfixOp {
    match tok {
        InfixToken::Union => PostfixOp::Union,
        InfixToken::Concat => PostfixOp::Concat,
        InfixToken::Star => PostfixOp::Star,
        InfixToken::Plus => PostfixOp::Plus,
        InfixToken::Question => PostfixOp::Question,
        InfixToken::Symbol(_) | InfixToken::LParen | InfixToken::RParen => unreachable!(),
    }
}

/// Arity check over the finished program. Guarantees the NFA builder's
/// fragment stack can never underflow on a validated program.
fn validate(ops: &[PostfixOp]) -> Result<(), PatternError> {
    let mut depth = 0usize;
    for &op in ops {
        match op {
            PostfixOp::Symbol(_) => depth += 1,
            PostfixOp::Star | PostfixOp::Plus | PostfixOp::Question => {
                if depth == 0 {
                    return Err(PatternError::MissingOperand { op: op.as_char() });
                }
            }
            PostfixOp::Concat | PostfixOp::Union => {
                if depth < 2 {
                    return Err(PatternError::MissingOperand { op: op.as_char() });
                }
                depth -= 1;
            }
        }
    }
    match depth {
        0 => Err(PatternError::EmptyPattern),
        1 => Ok(()),
        // More than one disconnected operand cannot come out of the
        // shunting stack; kept for completeness.
        _ => Err(PatternError::MissingOperand { op: '^' }),
    }
}

/// Preprocess one pattern: tokenize, make concatenation explicit, convert
/// to postfix, and discover the alphabet.
///
/// # Errors
///
/// Returns a [`PatternError`] for unbalanced parentheses, empty patterns,
/// and operators with missing operands.
pub fn prepare(pattern: &str) -> Result<PostfixProgram, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::EmptyPattern);
    }
    let tokens = scan(pattern);
    to_postfix(&insert_concat(&tokens))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(tokens: &[InfixToken]) -> String {
        tokens.iter().map(|t| t.as_char()).collect()
    }

    // (pattern, after concat insertion, postfix, alphabet)
    const CONVERSIONS: &[(&str, &str, &str, &str)] = &[
        ("ab", "a^b", "ab^", "ab"),
        ("a|b", "a|b", "ab|", "ab"),
        ("a*b", "a*^b", "a*b^", "ab"),
        ("(a)b", "(a)^b", "ab^", "ab"),
        ("a(b)", "a^(b)", "ab^", "ab"),
        ("a|b*c", "a|b*^c", "ab*c^|", "abc"),
        ("a*b|c", "a*^b|c", "a*b^c|", "abc"),
        ("a*(b|c)", "a*^(b|c)", "a*bc|^", "abc"),
        ("(a|b)c*", "(a|b)^c*", "ab|c*^", "abc"),
        ("(a*b)|c", "(a*^b)|c", "a*b^c|", "abc"),
        ("a*(b*c)", "a*^(b*^c)", "a*b*c^^", "abc"),
        ("a|b|c", "a|b|c", "ab|c|", "abc"),
        ("a*b*c", "a*^b*^c", "a*b*^c^", "abc"),
        ("a|b*c|d", "a|b*^c|d", "ab*c^|d|", "abcd"),
        ("a*(b|c)*d", "a*^(b|c)*^d", "a*bc|*^d^", "abcd"),
        ("(a*b*)*", "(a*^b*)*", "a*b*^*", "ab"),
        ("a|b|(cd)*", "a|b|(c^d)*", "ab|cd^*|", "abcd"),
        // one-or-more
        ("a+", "a+", "a+", "a"),
        ("ab+", "a^b+", "ab+^", "ab"),
        ("a+b", "a+^b", "a+b^", "ab"),
        ("a+|b", "a+|b", "a+b|", "ab"),
        ("(a+)b", "(a+)^b", "a+b^", "ab"),
        ("a*b+|c", "a*^b+|c", "a*b+^c|", "abc"),
        ("(a+|b)c*", "(a+|b)^c*", "a+b|c*^", "abc"),
        ("a+(b*c)", "a+^(b*^c)", "a+b*c^^", "abc"),
        ("a+|b+|c", "a+|b+|c", "a+b+|c|", "abc"),
        ("(a*b*)+", "(a*^b*)+", "a*b*^+", "ab"),
        ("a+(b|c)*d", "a+^(b|c)*^d", "a+bc|*^d^", "abcd"),
        // optional
        ("a?", "a?", "a?", "a"),
        ("ab?", "a^b?", "ab?^", "ab"),
        ("a?b", "a?^b", "a?b^", "ab"),
        ("a?|b", "a?|b", "a?b|", "ab"),
        ("a*b?|c", "a*^b?|c", "a*b?^c|", "abc"),
        ("(a?|b)c*", "(a?|b)^c*", "a?b|c*^", "abc"),
        ("a?|b?|c", "a?|b?|c", "a?b?|c|", "abc"),
        ("(a*b*)?", "(a*^b*)?", "a*b*^?", "ab"),
        ("a?(b|c)*d", "a?^(b|c)*^d", "a?bc|*^d^", "abcd"),
    ];

    #[test]
    fn concat_insertion() {
        for &(pattern, expected, _, _) in CONVERSIONS {
            let with_concat = insert_concat(&scan(pattern));
            assert_eq!(render(&with_concat), expected, "pattern {pattern}");
        }
    }

    #[test]
    fn postfix_conversion() {
        for &(pattern, _, expected, _) in CONVERSIONS {
            let program = prepare(pattern).unwrap();
            assert_eq!(program.to_string(), expected, "pattern {pattern}");
        }
    }

    #[test]
    fn alphabet_discovery() {
        for &(pattern, _, _, alphabet) in CONVERSIONS {
            let program = prepare(pattern).unwrap();
            let expected: Vec<char> = alphabet.chars().collect();
            assert_eq!(program.alphabet(), expected, "pattern {pattern}");
        }
    }

    #[test]
    fn unmatched_close_paren() {
        assert_eq!(prepare("a)b"), Err(PatternError::UnmatchedParen));
        assert_eq!(prepare(")"), Err(PatternError::UnmatchedParen));
    }

    #[test]
    fn unclosed_open_paren() {
        assert_eq!(prepare("(ab"), Err(PatternError::UnclosedParen));
        assert_eq!(prepare("((a)"), Err(PatternError::UnclosedParen));
    }

    #[test]
    fn empty_patterns() {
        assert_eq!(prepare(""), Err(PatternError::EmptyPattern));
        assert_eq!(prepare("()"), Err(PatternError::EmptyPattern));
    }

    #[test]
    fn missing_operands() {
        assert_eq!(
            prepare("|a"),
            Err(PatternError::MissingOperand { op: '|' })
        );
        assert_eq!(
            prepare("a|"),
            Err(PatternError::MissingOperand { op: '|' })
        );
        assert_eq!(
            prepare("*a"),
            Err(PatternError::MissingOperand { op: '*' })
        );
    }

    #[test]
    fn escapes_are_not_special() {
        // No escape syntax: every non-operator character is an operand,
        // including whitespace.
        let program = prepare(" +").unwrap();
        assert_eq!(program.to_string(), " +");
        assert_eq!(program.alphabet(), [' ']);
    }
}
