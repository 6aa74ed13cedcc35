//! Subset construction: epsilon-NFA to a deterministic automaton.
//!
//! Each DFA state stands for one set of NFA states; subsets are interned by
//! their sorted contents, so two DFA states are equal exactly when their
//! underlying NFA subsets are. The resulting DFA is partial: a missing
//! `(state, symbol)` edge means rejection at that point.
//!
//! A composite state covering several accept states resolves to the
//! highest-priority pattern among them; exact-priority ties go to the
//! earliest-registered pattern and are reported as [`Ambiguity`] values so
//! the caller can surface a warning.
//!
//! [`Dfa`] is also the compiled artifact handed to the scanner: start
//! state, per-symbol transition lookup, accept predicate and annotation,
//! plus read-only edge iteration for diagram or table tooling.

use hashbrown::{HashMap, HashSet};

use crate::nfa::{AcceptInfo, Nfa};

/// State id in the deterministic automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub u32);

impl StateId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DfaState {
    /// Outgoing edges, sorted by symbol for binary-search lookup.
    pub(crate) transitions: Vec<(char, StateId)>,
    pub(crate) accept: Option<AcceptInfo>,
}

impl DfaState {
    fn find_transition(&self, symbol: char) -> Option<StateId> {
        self.transitions
            .binary_search_by_key(&symbol, |&(c, _)| c)
            .ok()
            .map(|idx| self.transitions[idx].1)
    }
}

/// A deterministic finite automaton over a fixed alphabet.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub(crate) states: Vec<DfaState>,
    pub(crate) start: StateId,
    pub(crate) alphabet: Vec<char>,
}

impl Dfa {
    #[must_use]
    pub fn start(&self) -> StateId {
        self.start
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// The unique target of `(state, symbol)`, if defined.
    #[must_use]
    pub fn transition(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.states[state.index()].find_transition(symbol)
    }

    #[must_use]
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.states[state.index()].accept.is_some()
    }

    /// The winning pattern annotation of an accepting state.
    #[must_use]
    pub fn accept_info(&self, state: StateId) -> Option<AcceptInfo> {
        self.states[state.index()].accept
    }

    /// Outgoing edges of one state, in symbol order.
    pub fn edges(&self, state: StateId) -> impl Iterator<Item = (char, StateId)> + '_ {
        self.states[state.index()].transitions.iter().copied()
    }

    /// All state ids, for read-only traversal.
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len() as u32).map(StateId)
    }
}

/// An exact-priority tie between two patterns on some composite accept
/// state, resolved in favor of `winner` (the earlier-registered rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ambiguity {
    pub winner: u32,
    pub loser: u32,
    pub priority: i32,
}

fn resolve_accept(
    nfa: &Nfa,
    subset: &[u32],
    ambiguities: &mut Vec<Ambiguity>,
    seen: &mut HashSet<(u32, u32)>,
) -> Option<AcceptInfo> {
    let mut best: Option<AcceptInfo> = None;
    for &state in subset {
        if let Some(info) = nfa.accept(state) {
            match best {
                Some(b) if !info.beats(b) => {}
                _ => best = Some(info),
            }
        }
    }
    let best = best?;

    for &state in subset {
        if let Some(info) = nfa.accept(state) {
            if info.priority == best.priority
                && info.rule != best.rule
                && seen.insert((best.rule, info.rule))
            {
                ambiguities.push(Ambiguity {
                    winner: best.rule,
                    loser: info.rule,
                    priority: best.priority,
                });
            }
        }
    }
    Some(best)
}

/// Convert an NFA into an equivalent DFA via worklist subset construction.
///
/// Also returns the priority ties observed while resolving composite
/// accept states; the construction itself never fails.
#[must_use]
pub fn determinize(nfa: &Nfa) -> (Dfa, Vec<Ambiguity>) {
    let mut interned: HashMap<Vec<u32>, u32, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    let mut states: Vec<DfaState> = Vec::new();
    let mut worklist: Vec<Vec<u32>> = Vec::new();
    let mut ambiguities = Vec::new();
    let mut seen_ties = HashSet::new();

    let initial = nfa.epsilon_closure(&[nfa.start()]);
    interned.insert(initial.clone(), 0);
    states.push(DfaState {
        transitions: Vec::new(),
        accept: resolve_accept(nfa, &initial, &mut ambiguities, &mut seen_ties),
    });
    worklist.push(initial);

    while let Some(subset) = worklist.pop() {
        let id = interned[&subset];
        for &symbol in nfa.alphabet() {
            let moved = nfa.move_set(&subset, symbol);
            if moved.is_empty() {
                // Partial DFA: no edge recorded.
                continue;
            }
            let closure = nfa.epsilon_closure(&moved);
            let target = match interned.get(&closure) {
                Some(&existing) => existing,
                None => {
                    let fresh = u32::try_from(states.len()).unwrap_or(0);
                    interned.insert(closure.clone(), fresh);
                    states.push(DfaState {
                        transitions: Vec::new(),
                        accept: resolve_accept(nfa, &closure, &mut ambiguities, &mut seen_ties),
                    });
                    worklist.push(closure);
                    fresh
                }
            };
            // Alphabet iteration is sorted, so edges arrive in symbol order.
            states[id as usize].transitions.push((symbol, StateId(target)));
        }
    }

    (
        Dfa {
            states,
            start: StateId(0),
            alphabet: nfa.alphabet().to_vec(),
        },
        ambiguities,
    )
}

/// Walk the DFA over `input`, returning the final accept annotation if
/// every symbol had an edge and the last state accepts. Test helper shared
/// with the minimizer's tests.
#[cfg(test)]
pub(crate) fn run(dfa: &Dfa, input: &str) -> Option<AcceptInfo> {
    let mut state = dfa.start();
    for c in input.chars() {
        state = dfa.transition(state, c)?;
    }
    dfa.accept_info(state)
}

#[cfg(test)]
pub(crate) fn build_for_tests(patterns: &[(&str, i32)]) -> (Dfa, Vec<Ambiguity>) {
    use crate::postfix::prepare;

    let mut nfa = Nfa::new();
    let mut starts = Vec::new();
    let mut alphabet = Vec::new();
    for (i, &(pattern, priority)) in patterns.iter().enumerate() {
        let program = prepare(pattern).unwrap();
        let fragment = nfa.compile(&program).unwrap();
        nfa.set_accept(
            fragment.end,
            AcceptInfo {
                priority,
                rule: u32::try_from(i).unwrap(),
            },
        );
        starts.push(fragment.start);
        alphabet.extend_from_slice(program.alphabet());
    }
    nfa.merge_starts(&starts);
    nfa.set_alphabet(alphabet);
    determinize(&nfa)
}
