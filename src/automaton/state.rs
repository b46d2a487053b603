//! Core graph types for the automaton: state identifiers, states, and
//! merged transitions.
//!
//! States live in an arena owned by the `Automaton` and reference each other
//! only by `StateId`, never by pointer, so the graph can be cyclic while
//! cloning stays a plain copy of the arena.

use std::fmt;

use crate::interval::IntervalSet;

/// A state identifier: an index into the owning automaton's state list.
///
/// Identifiers are reassigned by `reindex`; never treat one as a stable
/// external identifier across mutations.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(pub(crate) u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// A transition between two states.
///
/// `labels` is `None` for an epsilon-only transition. The epsilon marker is
/// independent of the label set: after merging a symbol transition and an
/// epsilon transition to the same destination, one transition carries both.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub orig: StateId,
    pub dest: StateId,
    pub labels: Option<IntervalSet>,
    pub epsilon: bool,
}

impl Transition {
    pub(crate) fn with_labels(orig: StateId, dest: StateId, labels: IntervalSet) -> Self {
        Transition {
            orig,
            dest,
            labels: Some(labels),
            epsilon: false,
        }
    }

    pub(crate) fn epsilon(orig: StateId, dest: StateId) -> Self {
        Transition {
            orig,
            dest,
            labels: None,
            epsilon: true,
        }
    }

    /// Whether this transition carries an epsilon.
    pub fn has_epsilon(&self) -> bool {
        self.epsilon
    }

    /// The label set, empty when the transition is epsilon-only.
    pub fn label_set(&self) -> Option<&IntervalSet> {
        self.labels.as_ref()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> ", self.orig)?;
        if let Some(labels) = &self.labels {
            write!(f, "{}", labels)?;
        }
        if self.epsilon {
            write!(f, "e")?;
        }
        write!(f, " -> {}", self.dest)
    }
}

/// A state in the automaton graph.
///
/// A state owns at most one `Transition` per distinct destination; repeated
/// insertions toward the same destination merge label sets and OR the
/// epsilon markers.
#[derive(Clone, Debug)]
pub struct State {
    pub(crate) index: StateId,
    pub(crate) initial: bool,
    pub(crate) accept: bool,
    pub(crate) transitions: Vec<Transition>,
}

impl State {
    pub(crate) fn new(index: StateId) -> Self {
        State {
            index,
            initial: false,
            accept: false,
            transitions: Vec::new(),
        }
    }

    /// The state's position in the owning automaton.
    pub fn id(&self) -> StateId {
        self.index
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn is_accept(&self) -> bool {
        self.accept
    }

    /// Outgoing transitions, one per destination.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Merge a transition into this state, fusing with the existing
    /// transition to the same destination if there is one. Returns `true`
    /// if the new labels overlap the labels of a transition toward a
    /// *different* destination, which breaks determinism.
    pub(crate) fn merge_transition(&mut self, tr: Transition) -> bool {
        let mut overlaps = false;
        if let Some(new_labels) = &tr.labels {
            for existing in &self.transitions {
                if existing.dest == tr.dest {
                    continue;
                }
                if let Some(labels) = &existing.labels {
                    if labels.intersects(new_labels) {
                        overlaps = true;
                        break;
                    }
                }
            }
        }
        match self.transitions.iter_mut().find(|t| t.dest == tr.dest) {
            Some(existing) => {
                match (&mut existing.labels, tr.labels) {
                    (Some(labels), Some(new_labels)) => {
                        labels.add_set(&new_labels);
                    }
                    (slot @ None, Some(new_labels)) => *slot = Some(new_labels),
                    (_, None) => {}
                }
                existing.epsilon |= tr.epsilon;
            }
            None => self.transitions.push(tr),
        }
        overlaps
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.initial { "Q" } else { "q" },
            self.index.0,
            if self.accept { "*" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalSet;

    #[test]
    fn test_merge_same_destination() {
        let mut s = State::new(StateId(0));
        s.merge_transition(Transition::with_labels(
            StateId(0),
            StateId(1),
            IntervalSet::from_values(&[1]),
        ));
        s.merge_transition(Transition::with_labels(
            StateId(0),
            StateId(1),
            IntervalSet::from_values(&[3]),
        ));
        assert_eq!(s.transitions().len(), 1);
        let labels = s.transitions()[0].label_set().unwrap();
        assert!(labels.contains(1));
        assert!(labels.contains(3));
        assert!(!labels.contains(2));
    }

    #[test]
    fn test_merge_epsilon_onto_labels() {
        let mut s = State::new(StateId(0));
        s.merge_transition(Transition::with_labels(
            StateId(0),
            StateId(1),
            IntervalSet::from_values(&[1]),
        ));
        s.merge_transition(Transition::epsilon(StateId(0), StateId(1)));
        assert_eq!(s.transitions().len(), 1);
        let t = &s.transitions()[0];
        assert!(t.has_epsilon());
        assert!(t.label_set().unwrap().contains(1));
    }

    #[test]
    fn test_overlap_reported_for_other_destinations_only() {
        let mut s = State::new(StateId(0));
        assert!(!s.merge_transition(Transition::with_labels(
            StateId(0),
            StateId(1),
            IntervalSet::from_values(&[1, 2]),
        )));
        // Same destination, overlapping labels: merged, not an overlap
        assert!(!s.merge_transition(Transition::with_labels(
            StateId(0),
            StateId(1),
            IntervalSet::from_values(&[2, 3]),
        )));
        // Different destination, overlapping labels: breaks determinism
        assert!(s.merge_transition(Transition::with_labels(
            StateId(0),
            StateId(2),
            IntervalSet::from_values(&[3]),
        )));
        // Different destination, disjoint labels: fine
        assert!(!s.merge_transition(Transition::with_labels(
            StateId(0),
            StateId(3),
            IntervalSet::from_values(&[9]),
        )));
    }

    #[test]
    fn test_display() {
        let mut s = State::new(StateId(3));
        assert_eq!(s.to_string(), "q3");
        s.initial = true;
        s.accept = true;
        assert_eq!(s.to_string(), "Q3*");

        let t = Transition::with_labels(StateId(0), StateId(1), IntervalSet::from_values(&[1, 3]));
        assert_eq!(t.to_string(), "q0 -> {[1],[3]} -> q1");
        let e = Transition::epsilon(StateId(2), StateId(0));
        assert_eq!(e.to_string(), "q2 -> e -> q0");
    }
}
