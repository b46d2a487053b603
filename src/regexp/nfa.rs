//! Thompson-style construction from a syntax tree to an epsilon-NFA.
//!
//! Fragments are composed by splicing state arenas and wiring epsilon
//! transitions directly; no intermediate determinization or minimization
//! happens here, so construction is linear in the tree size (times the
//! repetition bounds).

use crate::automaton::ops::splice;
use crate::automaton::{Automaton, StateId};
use crate::interval::Interval;
use crate::regexp::parser::RegExp;

impl RegExp {
    /// Build an epsilon-NFA accepting this expression's language.
    pub fn to_nfa(&self) -> Automaton {
        to_nfa(self)
    }
}

fn init_of(frag: &Automaton) -> StateId {
    // Fragments built here always carry an initial state.
    frag.initial().unwrap_or(StateId(0))
}

/// Splice `frag` onto the accepting states of `out`: every accepting state
/// of `out` gets an epsilon edge to the copy of `frag`'s initial state, and
/// the copies of `frag`'s accepting states become accepting. With
/// `keep_accepts` the old accepting states stay accepting too, which makes
/// the extra copy optional.
fn concat_into(out: &mut Automaton, frag: &Automaton, keep_accepts: bool) {
    let old_accepts = out.accept_states();
    let offset = splice(out, frag);
    let frag_init = StateId(init_of(frag).0 + offset);
    for id in old_accepts {
        out.add_epsilon_transition(id, frag_init);
        if !keep_accepts {
            out.set_accept(id, false);
        }
    }
    for id in frag.accept_states() {
        out.set_accept(StateId(id.0 + offset), true);
    }
}

fn two_state(label: Option<Interval>) -> Automaton {
    let mut out = Automaton::new();
    let s0 = out.add_state();
    let s1 = out.add_state();
    out.set_initial(s0);
    out.set_accept(s1, true);
    match label {
        Some(interval) => out.add_transition(s0, s1, interval),
        None => out.add_epsilon_transition(s0, s1),
    }
    out
}

/// Build an epsilon-NFA for `re`.
pub fn to_nfa(re: &RegExp) -> Automaton {
    match re {
        RegExp::Epsilon => two_state(None),
        RegExp::Any => two_state(Some(Interval::FULL)),
        RegExp::Symbol(v) => two_state(Some(Interval::point(*v))),
        RegExp::Sequence(left, right) => {
            let mut out = to_nfa(left);
            concat_into(&mut out, &to_nfa(right), false);
            out
        }
        RegExp::Alternation(left, right) => {
            let left = to_nfa(left);
            let right = to_nfa(right);
            let mut out = Automaton::new();
            let init = out.add_state();
            out.set_initial(init);
            let off_l = splice(&mut out, &left);
            let off_r = splice(&mut out, &right);
            out.add_epsilon_transition(init, StateId(init_of(&left).0 + off_l));
            out.add_epsilon_transition(init, StateId(init_of(&right).0 + off_r));
            for id in left.accept_states() {
                out.set_accept(StateId(id.0 + off_l), true);
            }
            for id in right.accept_states() {
                out.set_accept(StateId(id.0 + off_r), true);
            }
            out
        }
        RegExp::Star(inner) => {
            let frag = to_nfa(inner);
            let mut out = Automaton::new();
            let init = out.add_state();
            out.set_initial(init);
            let offset = splice(&mut out, &frag);
            let frag_init = StateId(init_of(&frag).0 + offset);
            let accept = out.add_state();
            out.set_accept(accept, true);
            out.add_epsilon_transition(init, frag_init);
            out.add_epsilon_transition(init, accept);
            for id in frag.accept_states() {
                let image = StateId(id.0 + offset);
                out.add_epsilon_transition(image, frag_init);
                out.add_epsilon_transition(image, accept);
            }
            out
        }
        RegExp::Plus(inner) => {
            let mut out = to_nfa(inner);
            let star = to_nfa(&RegExp::Star(inner.clone()));
            concat_into(&mut out, &star, false);
            out
        }
        RegExp::Repeat { inner, min, max } => {
            let frag = to_nfa(inner);
            let mut out = Automaton::new();
            let s0 = out.add_state();
            out.set_initial(s0);
            out.set_accept(s0, true);
            for _ in 0..*min {
                concat_into(&mut out, &frag, false);
            }
            // Optional copies: the accepting front before each copy stays
            // accepting, so any repetition count up to `max` is reachable.
            for _ in *min..*max {
                concat_into(&mut out, &frag, true);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regexp::parser::parse;

    fn nfa(pattern: &str) -> Automaton {
        to_nfa(&parse(pattern).unwrap())
    }

    #[test]
    fn test_epsilon_accepts_empty_word_only() {
        let a = nfa("");
        assert!(a.run(&[]));
        assert!(!a.run(&[0]));
    }

    #[test]
    fn test_symbol_and_bracket() {
        let a = nfa("5");
        assert!(a.run(&[5]));
        assert!(!a.run(&[6]));
        assert!(!a.run(&[]));

        let a = nfa("<-1000000>");
        assert!(a.run(&[-1_000_000]));
        assert!(!a.run(&[1_000_000]));
    }

    #[test]
    fn test_any_matches_every_symbol() {
        let a = nfa(".");
        assert!(a.run(&[i64::MIN]));
        assert!(a.run(&[0]));
        assert!(a.run(&[i64::MAX]));
        assert!(!a.run(&[]));
        assert!(!a.run(&[1, 2]));
    }

    #[test]
    fn test_sequence_and_alternation() {
        let a = nfa("12|3");
        assert!(a.run(&[1, 2]));
        assert!(a.run(&[3]));
        assert!(!a.run(&[1]));
        assert!(!a.run(&[1, 2, 3]));
    }

    #[test]
    fn test_star() {
        let a = nfa("(12)*");
        assert!(a.run(&[]));
        assert!(a.run(&[1, 2]));
        assert!(a.run(&[1, 2, 1, 2]));
        assert!(!a.run(&[1]));
        assert!(!a.run(&[1, 2, 1]));
    }

    #[test]
    fn test_plus_requires_one_occurrence() {
        let a = nfa("1+");
        assert!(!a.run(&[]));
        assert!(a.run(&[1]));
        assert!(a.run(&[1, 1, 1]));
        assert!(!a.run(&[1, 2]));
    }

    #[test]
    fn test_repeat_bounds() {
        let a = nfa("1{2,4}");
        assert!(!a.run(&[1]));
        assert!(a.run(&[1, 1]));
        assert!(a.run(&[1, 1, 1]));
        assert!(a.run(&[1, 1, 1, 1]));
        assert!(!a.run(&[1, 1, 1, 1, 1]));

        let a = nfa("2{3}");
        assert!(a.run(&[2, 2, 2]));
        assert!(!a.run(&[2, 2]));
        assert!(!a.run(&[2, 2, 2, 2]));

        let a = nfa("1{0,1}");
        assert!(a.run(&[]));
        assert!(a.run(&[1]));
        assert!(!a.run(&[1, 1]));
    }

    #[test]
    fn test_nested_composition() {
        let a = nfa("(1|2)*3");
        assert!(a.run(&[3]));
        assert!(a.run(&[1, 2, 2, 1, 3]));
        assert!(!a.run(&[1, 2]));
        assert!(!a.run(&[3, 1]));
    }
}
