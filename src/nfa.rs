//! Thompson construction: postfix programs to an epsilon-NFA.
//!
//! States are dense `u32` indices into an arena owned by the [`Nfa`]; a
//! state carries its symbol transitions, epsilon targets, and an optional
//! accept annotation directly on the record. Each [`Nfa`] owns its own
//! state allocator, so independent compiles never share counters and ids
//! are monotonic within one construction pass.
//!
//! Compilation works over an explicit stack of [`Fragment`] values, one
//! handler per postfix operator. Several tagged patterns can be compiled
//! into the same arena and then joined with [`Nfa::merge_starts`], which
//! adds one global start state while keeping every pattern's accept state
//! distinct, so later stages can still tell which pattern matched.

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::error::CompileError;
use crate::postfix::{PostfixOp, PostfixProgram};

/// Accept annotation: the priority of the owning pattern and its
/// registration index. Higher priority wins; on an exact tie the lower
/// (earlier-registered) rule index wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcceptInfo {
    pub priority: i32,
    pub rule: u32,
}

impl AcceptInfo {
    /// Tie-break order for composite accept states.
    #[must_use]
    pub(crate) fn beats(self, other: Self) -> bool {
        self.priority > other.priority
            || (self.priority == other.priority && self.rule < other.rule)
    }
}

/// A sub-automaton under construction: one entry and one exit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Default)]
struct NfaState {
    /// Symbol transitions out of this state. Thompson states carry at most
    /// one, but composite arenas keep the general shape.
    transitions: SmallVec<[(char, u32); 2]>,
    /// Epsilon targets, in insertion order.
    epsilon: SmallVec<[u32; 2]>,
    accept: Option<AcceptInfo>,
}

/// An epsilon-NFA over a dense state arena.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    states: Vec<NfaState>,
    start: u32,
    alphabet: Vec<char>,
}

impl Nfa {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Symbols the merged patterns can consume, sorted and deduplicated.
    #[must_use]
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    #[must_use]
    pub fn accept(&self, state: u32) -> Option<AcceptInfo> {
        self.states[state as usize].accept
    }

    fn add_state(&mut self) -> u32 {
        let id = u32::try_from(self.states.len()).unwrap_or(0);
        self.states.push(NfaState::default());
        id
    }

    fn add_transition(&mut self, from: u32, symbol: char, to: u32) {
        self.states[from as usize].transitions.push((symbol, to));
    }

    fn add_epsilon(&mut self, from: u32, to: u32) {
        self.states[from as usize].epsilon.push(to);
    }

    /// Compile one postfix program into this arena, returning its fragment.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedPostfix`] if the fragment stack
    /// underflows or more than one fragment remains. Programs produced by
    /// [`crate::postfix::prepare`] never trigger this.
    pub fn compile(&mut self, program: &PostfixProgram) -> Result<Fragment, CompileError> {
        let mut stack: Vec<Fragment> = Vec::new();

        for &op in program.ops() {
            match op {
                PostfixOp::Symbol(c) => {
                    let start = self.add_state();
                    let end = self.add_state();
                    self.add_transition(start, c, end);
                    stack.push(Fragment { start, end });
                }
                PostfixOp::Concat => {
                    let second = stack.pop().ok_or(CompileError::MalformedPostfix)?;
                    let first = stack.pop().ok_or(CompileError::MalformedPostfix)?;
                    self.add_epsilon(first.end, second.start);
                    stack.push(Fragment {
                        start: first.start,
                        end: second.end,
                    });
                }
                PostfixOp::Union => {
                    let start = self.add_state();
                    let end = self.add_state();
                    let b = stack.pop().ok_or(CompileError::MalformedPostfix)?;
                    let a = stack.pop().ok_or(CompileError::MalformedPostfix)?;
                    self.add_epsilon(start, a.start);
                    self.add_epsilon(start, b.start);
                    self.add_epsilon(a.end, end);
                    self.add_epsilon(b.end, end);
                    stack.push(Fragment { start, end });
                }
                PostfixOp::Star => {
                    let start = self.add_state();
                    let end = self.add_state();
                    let sub = stack.pop().ok_or(CompileError::MalformedPostfix)?;
                    self.add_epsilon(start, sub.start);
                    self.add_epsilon(start, end);
                    self.add_epsilon(sub.end, sub.start);
                    self.add_epsilon(sub.end, end);
                    stack.push(Fragment { start, end });
                }
                PostfixOp::Plus => {
                    let start = self.add_state();
                    let end = self.add_state();
                    let sub = stack.pop().ok_or(CompileError::MalformedPostfix)?;
                    // No start-to-end epsilon: at least one traversal of
                    // the sub-automaton is forced.
                    self.add_epsilon(start, sub.start);
                    self.add_epsilon(sub.end, end);
                    self.add_epsilon(sub.end, sub.start);
                    stack.push(Fragment { start, end });
                }
                PostfixOp::Question => {
                    let start = self.add_state();
                    let end = self.add_state();
                    let sub = stack.pop().ok_or(CompileError::MalformedPostfix)?;
                    self.add_epsilon(start, sub.start);
                    self.add_epsilon(start, end);
                    // No loop back: zero or one traversal.
                    self.add_epsilon(sub.end, end);
                    stack.push(Fragment { start, end });
                }
            }
        }

        match (stack.pop(), stack.pop()) {
            (Some(fragment), None) => Ok(fragment),
            _ => Err(CompileError::MalformedPostfix),
        }
    }

    /// Tag a state (a pattern fragment's end) as accepting.
    pub fn set_accept(&mut self, state: u32, info: AcceptInfo) {
        self.states[state as usize].accept = Some(info);
    }

    /// Join several pattern fragments under one global start state.
    ///
    /// With a single pattern the fragment's own start is kept; otherwise a
    /// fresh state epsilon-branches to every pattern start. Accept states
    /// are left untouched and stay distinct.
    pub fn merge_starts(&mut self, starts: &[u32]) {
        match starts {
            [only] => self.start = *only,
            starts => {
                let global = self.add_state();
                for &s in starts {
                    self.add_epsilon(global, s);
                }
                self.start = global;
            }
        }
    }

    /// Fix the automaton's alphabet once all patterns are merged.
    pub fn set_alphabet(&mut self, mut alphabet: Vec<char>) {
        alphabet.sort_unstable();
        alphabet.dedup();
        self.alphabet = alphabet;
    }

    /// Set of states reachable from `seed` without consuming input,
    /// including `seed` itself. Iterative, returned sorted.
    #[must_use]
    pub fn epsilon_closure(&self, seed: &[u32]) -> Vec<u32> {
        let mut reached: HashSet<u32> = seed.iter().copied().collect();
        let mut stack: Vec<u32> = seed.to_vec();

        while let Some(state) = stack.pop() {
            for &next in &self.states[state as usize].epsilon {
                if reached.insert(next) {
                    stack.push(next);
                }
            }
        }

        let mut closure: Vec<u32> = reached.into_iter().collect();
        closure.sort_unstable();
        closure
    }

    /// Union of the direct (non-epsilon) transitions of every state in
    /// `set` on `symbol`. Returned sorted; empty when no state moves.
    #[must_use]
    pub fn move_set(&self, set: &[u32], symbol: char) -> Vec<u32> {
        let mut targets = Vec::new();
        for &state in set {
            for &(c, to) in &self.states[state as usize].transitions {
                if c == symbol {
                    targets.push(to);
                }
            }
        }
        targets.sort_unstable();
        targets.dedup();
        targets
    }
}
