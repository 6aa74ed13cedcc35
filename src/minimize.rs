//! DFA minimization by partition refinement.
//!
//! Blocks start out separated by accept annotation, not just by
//! final/non-final: two accept states belonging to differently-tagged
//! patterns are distinguishable by definition, because merging them would
//! lose the ability to report which pattern won. Refinement then splits
//! any block whose members disagree, on some alphabet symbol, about the
//! target block; a state with no edge on the symbol forms its own
//! sub-group. The result recognizes the same language with the same
//! annotations, in at most as many states.

use hashbrown::HashMap;

use crate::dfa::{Dfa, DfaState, StateId};
use crate::nfa::AcceptInfo;

/// Per-state split signature: the target block on each alphabet symbol,
/// `None` where the transition is undefined.
type Signature = Vec<Option<usize>>;

fn signature(dfa: &Dfa, state: u32, block_of: &[usize]) -> Signature {
    dfa.alphabet()
        .iter()
        .map(|&c| {
            dfa.transition(StateId(state), c)
                .map(|target| block_of[target.index()])
        })
        .collect()
}

/// Reduce `dfa` to an equivalent automaton with the fewest states that
/// still distinguish every accept annotation.
#[must_use]
pub fn minimize(dfa: &Dfa) -> Dfa {
    let n = dfa.state_count();

    // Initial partition keyed by accept annotation. Insertion order over
    // ascending state ids keeps block numbering deterministic.
    let mut block_of: Vec<usize> = vec![0; n];
    let mut blocks: Vec<Vec<u32>> = Vec::new();
    let mut by_accept: HashMap<Option<AcceptInfo>, usize, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    for state in 0..n as u32 {
        let key = dfa.accept_info(StateId(state));
        let block = *by_accept.entry(key).or_insert_with(|| {
            blocks.push(Vec::new());
            blocks.len() - 1
        });
        blocks[block].push(state);
        block_of[state as usize] = block;
    }

    // Moore-style refinement: sweep all blocks until none splits.
    loop {
        let mut changed = false;

        for block in 0..blocks.len() {
            if blocks[block].len() < 2 {
                continue;
            }

            // Group members by signature; linear scan keeps group order
            // (and hence renumbering) deterministic.
            let mut groups: Vec<(Signature, Vec<u32>)> = Vec::new();
            for &state in &blocks[block] {
                let sig = signature(dfa, state, &block_of);
                match groups.iter_mut().find(|(g, _)| *g == sig) {
                    Some((_, members)) => members.push(state),
                    None => groups.push((sig, vec![state])),
                }
            }
            if groups.len() < 2 {
                continue;
            }

            // First group keeps the block id, the rest become new blocks.
            let mut groups = groups.into_iter();
            if let Some((_, members)) = groups.next() {
                blocks[block] = members;
            }
            for (_, members) in groups {
                let fresh = blocks.len();
                for &state in &members {
                    block_of[state as usize] = fresh;
                }
                blocks.push(members);
            }
            changed = true;
        }

        if !changed {
            break;
        }
    }

    // Renumber blocks as states. Members of one block agree on accept
    // annotation and on target blocks, so any representative works.
    let mut states = Vec::with_capacity(blocks.len());
    for members in &blocks {
        let rep = members[0];
        let transitions = dfa
            .edges(StateId(rep))
            .map(|(c, target)| (c, StateId(block_of[target.index()] as u32)))
            .collect();
        states.push(DfaState {
            transitions,
            accept: dfa.accept_info(StateId(rep)),
        });
    }

    Dfa {
        states,
        start: StateId(block_of[dfa.start().index()] as u32),
        alphabet: dfa.alphabet().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dfa::{build_for_tests, run};

    #[test]
    fn classic_textbook_reduction() {
        // (a|b)*abb determinizes into more states than its 4-state minimum.
        let (dfa, _) = build_for_tests(&[("(a|b)*abb", 1)]);
        let minimal = minimize(&dfa);

        assert!(minimal.state_count() <= dfa.state_count());
        assert_eq!(minimal.state_count(), 4);

        for input in ["abb", "aabb", "babb", "abababb", "", "ab", "abba", "bbb"] {
            assert_eq!(
                run(&minimal, input).is_some(),
                run(&dfa, input).is_some(),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn idempotent() {
        let (dfa, _) = build_for_tests(&[("(a|b)*abb", 1), ("a+", 2)]);
        let once = minimize(&dfa);
        let twice = minimize(&once);
        assert_eq!(once.state_count(), twice.state_count());
    }

    #[test]
    fn preserves_accept_annotations() {
        let (dfa, _) = build_for_tests(&[("ab", 1), ("bb", 1)]);
        let minimal = minimize(&dfa);

        assert_eq!(run(&minimal, "ab").map(|i| i.rule), Some(0));
        assert_eq!(run(&minimal, "bb").map(|i| i.rule), Some(1));
        assert_eq!(run(&minimal, "ba"), None);
    }

    #[test]
    fn differently_tagged_accepts_never_merge() {
        // Both accept states are dead ends with identical (empty) outgoing
        // behavior; only the tag distinguishes them. They must survive as
        // two states.
        let (dfa, _) = build_for_tests(&[("a", 1), ("b", 1)]);
        let minimal = minimize(&dfa);

        let accepting: Vec<_> = minimal
            .states()
            .filter(|&s| minimal.is_accepting(s))
            .collect();
        assert_eq!(accepting.len(), 2);
        assert_eq!(run(&minimal, "a").map(|i| i.rule), Some(0));
        assert_eq!(run(&minimal, "b").map(|i| i.rule), Some(1));
    }

    #[test]
    fn merges_equivalent_same_tag_accepts() {
        // a|aa|aaa has three accept states in the raw DFA sharing one tag;
        // minimization may fold the chain's tail but must keep the
        // language: exactly one, two, or three 'a's.
        let (dfa, _) = build_for_tests(&[("a|aa|aaa", 1)]);
        let minimal = minimize(&dfa);

        assert!(minimal.state_count() <= dfa.state_count());
        assert!(run(&minimal, "a").is_some());
        assert!(run(&minimal, "aa").is_some());
        assert!(run(&minimal, "aaa").is_some());
        assert_eq!(run(&minimal, ""), None);
        assert_eq!(run(&minimal, "aaaa"), None);
    }

    #[test]
    fn start_state_follows_its_block() {
        let (dfa, _) = build_for_tests(&[("a*", 1)]);
        let minimal = minimize(&dfa);
        // a* accepts the empty string: the start state itself accepts.
        assert!(minimal.is_accepting(minimal.start()));
    }
}
