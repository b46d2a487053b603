//! Algebraic operations on automata.
//!
//! Every function here treats its operands as read-only and returns a fresh
//! automaton: callers keep using their inputs afterwards. The key
//! algorithms are:
//!
//! - `determinize`: subset construction over disjunction atoms
//! - `minimize_brzozowski`: double reverse/determinize
//! - `minimize_hopcroft`: partition refinement
//! - `revert`, `concatenate`, `union`, `complement`: language operations

use rustc_hash::{FxHashMap, FxHashSet};

use crate::automaton::graph::Automaton;
use crate::automaton::state::StateId;
use crate::interval::{Interval, IntervalSet};
use crate::AutomatonError;

/// Strategy used by [`minimize_with`].
///
/// Brzozowski is worst-case exponential (two determinizations) but simple
/// and usually fast in practice; Hopcroft is the O(n·|Σ|·log n) partition
/// refinement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinimizationAlgorithm {
    Brzozowski,
    Hopcroft,
}

/// Minimize with the default strategy (Brzozowski).
pub fn minimize(base: &Automaton) -> Result<Automaton, AutomatonError> {
    minimize_with(base, MinimizationAlgorithm::Brzozowski)
}

/// Minimize with an explicit strategy.
pub fn minimize_with(
    base: &Automaton,
    algo: MinimizationAlgorithm,
) -> Result<Automaton, AutomatonError> {
    match algo {
        MinimizationAlgorithm::Brzozowski => minimize_brzozowski(base),
        MinimizationAlgorithm::Hopcroft => minimize_hopcroft(base),
    }
}

/// Epsilon closure of a set of states, filtered the way subset construction
/// wants it: once the closure converges, non-accepting states whose
/// transitions are all epsilon-only are dropped. Such a state contributes
/// neither a move on any symbol nor acceptance, so subsets differing only
/// in them are the same DFA state. Accepting states always stay.
fn closure(a: &Automaton, seeds: &FxHashSet<StateId>) -> FxHashSet<StateId> {
    let mut out = a.epsilon_closure(seeds);
    out.retain(|&id| {
        let state = a.state(id);
        let trs = state.transitions();
        state.is_accept()
            || trs.is_empty()
            || trs
                .iter()
                .any(|t| t.label_set().is_some_and(|l| !l.is_empty()))
    });
    out
}

/// States reachable from `states` by consuming any symbol of `atom`,
/// epsilon-closed.
fn move_set(a: &Automaton, states: &[StateId], atom: &Interval) -> FxHashSet<StateId> {
    let mut out = FxHashSet::default();
    for &id in states {
        for t in a.state(id).transitions() {
            if let Some(labels) = t.label_set() {
                if labels.intersects_interval(atom) {
                    out.insert(t.dest);
                }
            }
        }
    }
    if out.is_empty() {
        return out;
    }
    closure(a, &out)
}

fn sorted(set: FxHashSet<StateId>) -> Vec<StateId> {
    let mut v: Vec<StateId> = set.into_iter().collect();
    v.sort_unstable();
    v
}

/// Subset construction: build a DFA whose states are epsilon-closed sets of
/// NFA states, branching on the disjunction atoms of the outgoing labels
/// instead of individual symbols.
///
/// An already-deterministic input is returned as a clone. Fails with
/// `NoInitialState` when the input has no initial state.
pub fn determinize(nfa: &Automaton) -> Result<Automaton, AutomatonError> {
    if nfa.is_deterministic() {
        return Ok(nfa.clone());
    }
    let init = nfa.initial().ok_or(AutomatonError::NoInitialState)?;

    let mut seed = FxHashSet::default();
    seed.insert(init);
    let start = sorted(closure(nfa, &seed));

    let mut dfa = Automaton::new();
    let d0 = dfa.add_state();
    dfa.set_initial(d0);
    if start.iter().any(|&id| nfa.is_accept(id)) {
        dfa.set_accept(d0, true);
    }

    // Memoize DFA states by the exact source-state set so identical
    // subsets collapse.
    let mut assoc: FxHashMap<Vec<StateId>, StateId> = FxHashMap::default();
    assoc.insert(start.clone(), d0);
    let mut worklist = vec![start];

    while let Some(current) = worklist.pop() {
        let cur_dfa = assoc[&current];

        let mut intervals: Vec<Interval> = Vec::new();
        for &id in &current {
            for t in nfa.state(id).transitions() {
                if let Some(labels) = t.label_set() {
                    intervals.extend(labels.iter().copied());
                }
            }
        }
        let atoms = IntervalSet::disjunction(&intervals);

        for atom in atoms {
            let next = move_set(nfa, &current, &atom);
            if next.is_empty() {
                continue;
            }
            let key = sorted(next);
            let dest = match assoc.get(&key) {
                Some(&d) => d,
                None => {
                    let d = dfa.add_state();
                    if key.iter().any(|&id| nfa.is_accept(id)) {
                        dfa.set_accept(d, true);
                    }
                    assoc.insert(key.clone(), d);
                    worklist.push(key);
                    d
                }
            };
            dfa.add_transition(cur_dfa, dest, atom);
        }
    }

    Ok(dfa)
}

/// Brzozowski minimization: reverse, determinize, reverse, determinize,
/// then prune dead states. Yields the unique minimal DFA; worst case
/// exponential through the two determinizations.
pub fn minimize_brzozowski(base: &Automaton) -> Result<Automaton, AutomatonError> {
    let mut out = determinize(&revert(&determinize(&revert(base)?)?)?)?;
    out.remove_dead_states();
    Ok(out)
}

/// Hopcroft minimization: determinize and prune the input, then refine the
/// {accepting, non-accepting} partition over the disjunction atoms of the
/// whole transition alphabet until every block is transition-consistent.
pub fn minimize_hopcroft(base: &Automaton) -> Result<Automaton, AutomatonError> {
    let mut dfa = if base.is_deterministic() {
        base.clone()
    } else {
        determinize(base)?
    };
    if dfa.initial().is_none() {
        return Err(AutomatonError::NoInitialState);
    }
    dfa.remove_dead_states();
    let dfa_init = dfa.initial().ok_or(AutomatonError::NoInitialState)?;

    let mut intervals: Vec<Interval> = Vec::new();
    for s in dfa.states() {
        for t in s.transitions() {
            if let Some(labels) = t.label_set() {
                intervals.extend(labels.iter().copied());
            }
        }
    }
    let atoms = IntervalSet::disjunction(&intervals);

    // Initial partition: accepting vs. non-accepting, empty blocks dropped.
    let mut accepting: FxHashSet<StateId> = FxHashSet::default();
    let mut rejecting: FxHashSet<StateId> = FxHashSet::default();
    for s in dfa.states() {
        if s.is_accept() {
            accepting.insert(s.id());
        } else {
            rejecting.insert(s.id());
        }
    }
    let mut blocks: Vec<FxHashSet<StateId>> = Vec::new();
    if !accepting.is_empty() {
        blocks.push(accepting);
    }
    if !rejecting.is_empty() {
        blocks.push(rejecting);
    }
    let mut worklist: Vec<usize> = (0..blocks.len()).collect();

    while let Some(bi) = worklist.pop() {
        let splitter = blocks[bi].clone();
        for atom in &atoms {
            // X: states with a transition on this atom into the splitter.
            let mut x: FxHashSet<StateId> = FxHashSet::default();
            for s in dfa.states() {
                for t in s.transitions() {
                    if splitter.contains(&t.dest)
                        && t.label_set().is_some_and(|l| l.intersects_interval(atom))
                    {
                        x.insert(s.id());
                        break;
                    }
                }
            }
            if x.is_empty() {
                continue;
            }

            let block_count = blocks.len();
            for yi in 0..block_count {
                let inside: FxHashSet<StateId> =
                    blocks[yi].intersection(&x).copied().collect();
                if inside.is_empty() || inside.len() == blocks[yi].len() {
                    continue;
                }
                let outside: FxHashSet<StateId> =
                    blocks[yi].difference(&x).copied().collect();
                let new_idx = blocks.len();
                blocks[yi] = inside;
                blocks.push(outside);
                if worklist.contains(&yi) {
                    // Y was pending: refine it into both pieces.
                    worklist.push(new_idx);
                } else if blocks[yi].len() <= blocks[new_idx].len() {
                    worklist.push(yi);
                } else {
                    worklist.push(new_idx);
                }
            }
        }
    }

    // Each block becomes one state; transitions are re-derived by mapping
    // endpoints through block membership, merging labels per destination.
    let mut block_of = vec![usize::MAX; dfa.num_states()];
    for (bi, block) in blocks.iter().enumerate() {
        for id in block {
            block_of[id.index()] = bi;
        }
    }

    let mut out = Automaton::new();
    let block_states: Vec<StateId> = blocks.iter().map(|_| out.add_state()).collect();
    for (bi, block) in blocks.iter().enumerate() {
        if block.iter().any(|&id| dfa.is_accept(id)) {
            out.set_accept(block_states[bi], true);
        }
        if block.contains(&dfa_init) {
            out.set_initial(block_states[bi]);
        }
    }

    let mut merged: FxHashMap<(usize, usize), IntervalSet> = FxHashMap::default();
    for s in dfa.states() {
        for t in s.transitions() {
            if let Some(labels) = t.label_set() {
                merged
                    .entry((block_of[s.id().index()], block_of[t.dest.index()]))
                    .or_default()
                    .add_set(labels);
            }
        }
    }
    let mut edges: Vec<((usize, usize), IntervalSet)> = merged.into_iter().collect();
    edges.sort_by_key(|(k, _)| *k);
    for ((from, to), labels) in edges {
        out.add_transition(block_states[from], block_states[to], labels);
    }

    out.reindex();
    Ok(out)
}

/// Copy every state and transition of `frag` into `target`, returning the
/// index offset: `frag`'s state `i` lands at `i + offset`. Initial and
/// accept flags of the fragment are not carried over; callers wire those.
pub(crate) fn splice(target: &mut Automaton, frag: &Automaton) -> u32 {
    let offset = target.num_states() as u32;
    for _ in 0..frag.num_states() {
        target.add_state();
    }
    for s in frag.states() {
        for t in s.transitions() {
            let orig = StateId(t.orig.0 + offset);
            let dest = StateId(t.dest.0 + offset);
            if let Some(labels) = t.label_set() {
                target.add_transition(orig, dest, labels.clone());
            }
            if t.has_epsilon() {
                target.add_epsilon_transition(orig, dest);
            }
        }
    }
    offset
}

/// Mirror of the language: edges reversed (labels and epsilon markers
/// alike), a fresh initial state epsilon-linked to the images of all
/// accepting states, and the image of the old initial state accepting.
pub fn revert(a: &Automaton) -> Result<Automaton, AutomatonError> {
    let a_init = a.initial().ok_or(AutomatonError::NoInitialState)?;
    let mut out = Automaton::new();
    for _ in 0..a.num_states() {
        out.add_state();
    }
    for s in a.states() {
        for t in s.transitions() {
            if let Some(labels) = t.label_set() {
                out.add_transition(t.dest, t.orig, labels.clone());
            }
            if t.has_epsilon() {
                out.add_epsilon_transition(t.dest, t.orig);
            }
        }
    }
    out.set_accept(a_init, true);
    let init = out.add_state();
    out.set_initial(init);
    for id in a.accept_states() {
        out.add_epsilon_transition(init, id);
    }
    Ok(out)
}

/// Concatenation: clone `first`, splice in a copy of `second`, epsilon-link
/// each of `first`'s former accepting states to `second`'s initial state
/// and demote them; `second`'s accepting states accept for the result.
/// Re-minimized only when both operands were deterministic, so a cheap DFA
/// stays a DFA and an NFA is left for the caller to determinize.
pub fn concatenate(first: &Automaton, second: &Automaton) -> Result<Automaton, AutomatonError> {
    first.initial().ok_or(AutomatonError::NoInitialState)?;
    let second_init = second.initial().ok_or(AutomatonError::NoInitialState)?;
    let both_deterministic = first.is_deterministic() && second.is_deterministic();

    let mut out = first.clone();
    let old_accepts = out.accept_states();
    let offset = splice(&mut out, second);
    for id in old_accepts {
        out.add_epsilon_transition(id, StateId(second_init.0 + offset));
        out.set_accept(id, false);
    }
    for id in second.accept_states() {
        out.set_accept(StateId(id.0 + offset), true);
    }

    if both_deterministic {
        return minimize(&out);
    }
    Ok(out)
}

/// Union: clone `first`, splice in a copy of `second`, and add a fresh
/// initial state epsilon-linked to both original initial states. An
/// operand without an initial state contributes nothing: the result is a
/// clone of the other operand. Re-minimized only when both operands were
/// deterministic.
pub fn union(first: &Automaton, second: &Automaton) -> Automaton {
    let Some(first_init) = first.initial() else {
        return second.clone();
    };
    let Some(second_init) = second.initial() else {
        return first.clone();
    };
    let both_deterministic = first.is_deterministic() && second.is_deterministic();

    let mut out = first.clone();
    let offset = splice(&mut out, second);
    for id in second.accept_states() {
        out.set_accept(StateId(id.0 + offset), true);
    }
    let init = out.add_state();
    out.add_epsilon_transition(init, first_init);
    out.add_epsilon_transition(init, StateId(second_init.0 + offset));
    out.set_initial(init);

    if both_deterministic {
        if let Ok(minimized) = minimize(&out) {
            return minimized;
        }
    }
    out
}

/// Complement of the language. The operand must be deterministic; it is
/// made total by routing every uncovered label range of every state to a
/// fresh accepting sink, then flipping all accept flags.
///
/// Complementing a non-deterministic operand would be incorrect, so that
/// is rejected; determinize first.
pub fn complement(a: &Automaton) -> Result<Automaton, AutomatonError> {
    a.initial().ok_or(AutomatonError::NoInitialState)?;
    if !a.is_deterministic() {
        return Err(AutomatonError::NotDeterministic);
    }

    let mut out = a.clone();
    let sink = out.add_state();
    let mut uncovered: Vec<(StateId, IntervalSet)> = Vec::new();
    for s in out.states() {
        let covered = IntervalSet::union_all(s.transitions().iter().filter_map(|t| t.label_set()));
        let missing = covered.complement();
        if !missing.is_empty() {
            uncovered.push((s.id(), missing));
        }
    }
    for s in 0..out.num_states() {
        let id = StateId(s as u32);
        let flipped = !out.is_accept(id);
        out.set_accept(id, flipped);
    }
    for (id, missing) in uncovered {
        out.add_transition(id, sink, missing);
    }
    out.set_accept(sink, true);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// NFA for (1|3)* built by hand.
    fn star_nfa() -> Automaton {
        let mut a = Automaton::new();
        let s0 = a.add_state();
        a.set_initial(s0);
        a.set_accept(s0, true);
        a.add_transition(s0, s0, &[1, 3][..]);
        a.add_epsilon_transition(s0, s0);
        a
    }

    #[test]
    fn test_determinize_requires_initial() {
        let mut a = Automaton::new();
        let s = a.add_state();
        a.set_accept(s, true);
        a.add_epsilon_transition(s, s); // force non-deterministic
        assert!(matches!(
            determinize(&a),
            Err(AutomatonError::NoInitialState)
        ));
    }

    #[test]
    fn test_determinize_of_dfa_is_clone() {
        let mut a = Automaton::new();
        let s0 = a.add_state();
        let s1 = a.add_state();
        a.set_initial(s0);
        a.set_accept(s1, true);
        a.add_transition(s0, s1, &[1][..]);
        let d = determinize(&a).unwrap();
        assert!(d.structurally_equal(&a));
    }

    #[test]
    fn test_determinize_collapses_subsets() {
        let nfa = star_nfa();
        let dfa = determinize(&nfa).unwrap();
        assert!(dfa.is_deterministic());
        assert!(dfa.run(&[]));
        assert!(dfa.run(&[1, 3, 1, 1, 3]));
        assert!(!dfa.run(&[1, 2]));
    }

    #[test]
    fn test_determinize_is_idempotent() {
        let nfa = star_nfa();
        let once = determinize(&nfa).unwrap();
        let twice = determinize(&once).unwrap();
        assert!(once.structurally_equal(&twice));
    }

    #[test]
    fn test_revert_reverses_language() {
        // Accepts exactly [1, 2]; reverted accepts exactly [2, 1]
        let mut a = Automaton::new();
        let s0 = a.add_state();
        let s1 = a.add_state();
        let s2 = a.add_state();
        a.set_initial(s0);
        a.set_accept(s2, true);
        a.add_transition(s0, s1, &[1][..]);
        a.add_transition(s1, s2, &[2][..]);

        let r = revert(&a).unwrap();
        assert!(r.run(&[2, 1]));
        assert!(!r.run(&[1, 2]));
        assert!(!r.run(&[2]));
    }

    #[test]
    fn test_revert_requires_initial() {
        let a = Automaton::new();
        assert!(matches!(revert(&a), Err(AutomatonError::NoInitialState)));
    }

    #[test]
    fn test_concatenate() {
        let a = Automaton::from_regexp("1").unwrap();
        let b = Automaton::from_regexp("2*").unwrap();
        let c = concatenate(&a, &b).unwrap();
        assert!(c.run(&[1]));
        assert!(c.run(&[1, 2, 2]));
        assert!(!c.run(&[2]));
        assert!(!c.run(&[1, 1]));
        // Both operands were deterministic: the result was re-minimized
        assert!(c.is_deterministic());
    }

    #[test]
    fn test_concatenate_requires_initials() {
        let a = Automaton::from_regexp("1").unwrap();
        let empty = Automaton::new();
        assert!(matches!(
            concatenate(&a, &empty),
            Err(AutomatonError::NoInitialState)
        ));
        assert!(matches!(
            concatenate(&empty, &a),
            Err(AutomatonError::NoInitialState)
        ));
    }

    #[test]
    fn test_union() {
        let a = Automaton::from_regexp("11").unwrap();
        let b = Automaton::from_regexp("2").unwrap();
        let u = union(&a, &b);
        assert!(u.run(&[1, 1]));
        assert!(u.run(&[2]));
        assert!(!u.run(&[1]));
        assert!(!u.run(&[1, 2]));
    }

    #[test]
    fn test_union_degenerate_operand() {
        let a = Automaton::from_regexp("1").unwrap();
        let empty = Automaton::new();
        let u = union(&a, &empty);
        assert!(u.run(&[1]));
        let u = union(&empty, &a);
        assert!(u.run(&[1]));
    }

    #[test]
    fn test_complement_rejects_nfa() {
        let nfa = star_nfa();
        assert!(matches!(
            complement(&nfa),
            Err(AutomatonError::NotDeterministic)
        ));
    }

    #[test]
    fn test_complement_flips_membership() {
        let dfa = Automaton::from_regexp("(1|3)*").unwrap();
        let comp = complement(&dfa).unwrap();
        for word in [
            &[][..],
            &[1][..],
            &[2][..],
            &[1, 3, 1][..],
            &[1, 2][..],
            &[9, 9][..],
        ] {
            assert_ne!(
                dfa.run(word),
                comp.run(word),
                "complement must flip acceptance of {:?}",
                word
            );
        }
    }

    #[test]
    fn test_complement_requires_initial() {
        let a = Automaton::new();
        assert!(matches!(
            complement(&a),
            Err(AutomatonError::NoInitialState)
        ));
    }

    #[test]
    fn test_minimize_agreement_simple() {
        let nfa = star_nfa();
        let brz = minimize_brzozowski(&nfa).unwrap();
        let hop = minimize_hopcroft(&nfa).unwrap();
        assert_eq!(brz.num_states(), hop.num_states());
        for word in [&[][..], &[1][..], &[3, 3, 1][..], &[1, 2][..], &[2][..]] {
            assert_eq!(brz.run(word), nfa.run(word));
            assert_eq!(hop.run(word), nfa.run(word));
        }
    }

    #[test]
    fn test_minimize_idempotent_state_count() {
        let nfa = star_nfa();
        let once = minimize(&nfa).unwrap();
        let twice = minimize(&once).unwrap();
        assert_eq!(once.num_states(), twice.num_states());
    }

    #[test]
    fn test_hopcroft_merges_equivalent_states() {
        // Two redundant accepting states reached by 1 and 2: the minimal
        // DFA needs only two states.
        let mut a = Automaton::new();
        let s0 = a.add_state();
        let s1 = a.add_state();
        let s2 = a.add_state();
        a.set_initial(s0);
        a.set_accept(s1, true);
        a.set_accept(s2, true);
        a.add_transition(s0, s1, &[1][..]);
        a.add_transition(s0, s2, &[2][..]);
        let hop = minimize_hopcroft(&a).unwrap();
        assert_eq!(hop.num_states(), 2);
        assert!(hop.run(&[1]));
        assert!(hop.run(&[2]));
        assert!(!hop.run(&[3]));
        assert!(!hop.run(&[1, 1]));
    }
}
