//! The automaton container: an arena of states, a single optional initial
//! state, and a cached determinism hint.
//!
//! All graph mutation goes through this type. The algebraic operations
//! (determinize, minimize, ...) live in `ops` and never mutate their
//! operands; the methods here delegate to them for convenience.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashSet;

use crate::automaton::ops;
use crate::automaton::state::{State, StateId, Transition};
use crate::interval::{IntervalSet, Symbol};
use crate::AutomatonError;

/// A finite automaton over the integer alphabet.
///
/// The automaton exclusively owns its states; states refer to each other by
/// index only, so `clone` deep-copies the whole graph with no sharing.
#[derive(Clone, Debug, Default)]
pub struct Automaton {
    pub(crate) states: Vec<State>,
    pub(crate) initial: Option<StateId>,
    pub(crate) deterministic: bool,
}

impl Automaton {
    /// Create an empty automaton.
    pub fn new() -> Self {
        Automaton {
            states: Vec::new(),
            initial: None,
            deterministic: true,
        }
    }

    /// Compile a regular expression into a minimal DFA.
    pub fn from_regexp(regexp: &str) -> Result<Self, AutomatonError> {
        crate::regexp::compile(regexp)
    }

    /// Append a new unconnected state and return its identifier.
    pub fn add_state(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State::new(id));
        id
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Whether the automaton has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Read-only view of a state.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    /// Iterate over all states in index order.
    pub fn states(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    /// Outgoing transitions of a state, one per destination.
    pub fn transitions_from(&self, id: StateId) -> &[Transition] {
        self.states[id.index()].transitions()
    }

    /// The initial state, if one has been set.
    pub fn initial(&self) -> Option<StateId> {
        self.initial
    }

    /// Make `id` the initial state. A previous initial state loses the
    /// flag: an automaton has at most one initial state.
    pub fn set_initial(&mut self, id: StateId) {
        if let Some(prev) = self.initial {
            self.states[prev.index()].initial = false;
        }
        self.initial = Some(id);
        self.states[id.index()].initial = true;
    }

    /// Toggle the accept flag of a state.
    pub fn set_accept(&mut self, id: StateId, accept: bool) {
        self.states[id.index()].accept = accept;
    }

    pub fn is_initial(&self, id: StateId) -> bool {
        self.initial == Some(id)
    }

    pub fn is_accept(&self, id: StateId) -> bool {
        self.states[id.index()].accept
    }

    /// Identifiers of all accepting states, in index order.
    pub fn accept_states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .filter(|s| s.accept)
            .map(|s| s.index)
            .collect()
    }

    /// Add a transition carrying the given labels, merging into the
    /// existing transition to the same destination if there is one. The
    /// determinism hint drops to `false` when the labels overlap another
    /// destination's labels from the same origin.
    pub fn add_transition<L: Into<IntervalSet>>(&mut self, orig: StateId, dest: StateId, labels: L) {
        let tr = Transition::with_labels(orig, dest, labels.into());
        let overlaps = self.states[orig.index()].merge_transition(tr);
        self.deterministic &= !overlaps;
    }

    /// Add an epsilon transition. The automaton is no longer known to be
    /// deterministic.
    pub fn add_epsilon_transition(&mut self, orig: StateId, dest: StateId) {
        self.states[orig.index()].merge_transition(Transition::epsilon(orig, dest));
        self.deterministic = false;
    }

    /// Whether the automaton is known to be deterministic. This is a hint
    /// maintained incrementally: it can drop to `false` on mutation but is
    /// only restored by `recompute_determinism` or by building a fresh
    /// automaton through determinize/minimize.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Re-derive the determinism flag from scratch: no epsilon transitions
    /// and no overlapping label sets toward distinct destinations.
    pub fn recompute_determinism(&mut self) -> bool {
        let mut det = true;
        'outer: for s in &self.states {
            for (i, a) in s.transitions.iter().enumerate() {
                if a.epsilon {
                    det = false;
                    break 'outer;
                }
                let Some(a_labels) = &a.labels else { continue };
                for b in s.transitions.iter().skip(i + 1) {
                    if let Some(b_labels) = &b.labels {
                        if a_labels.intersects(b_labels) {
                            det = false;
                            break 'outer;
                        }
                    }
                }
            }
        }
        self.deterministic = det;
        det
    }

    /// Full epsilon closure of a set of states (every state reachable
    /// through epsilon edges, the seeds included).
    pub(crate) fn epsilon_closure(&self, seeds: &FxHashSet<StateId>) -> FxHashSet<StateId> {
        let mut out = seeds.clone();
        let mut stack: Vec<StateId> = seeds.iter().copied().collect();
        while let Some(id) = stack.pop() {
            for t in self.states[id.index()].transitions() {
                if t.has_epsilon() && out.insert(t.dest) {
                    stack.push(t.dest);
                }
            }
        }
        out
    }

    /// Whether the automaton accepts the given word.
    ///
    /// Works on both DFAs and NFAs: an explicit state-set worklist is
    /// advanced one symbol at a time, so long words and heavily ambiguous
    /// automata cannot overflow the call stack. Returns `false` when no
    /// initial state is set.
    pub fn run(&self, word: &[Symbol]) -> bool {
        let Some(init) = self.initial else {
            return false;
        };
        let mut seed = FxHashSet::default();
        seed.insert(init);
        let mut current = self.epsilon_closure(&seed);
        for &symbol in word {
            let mut next = FxHashSet::default();
            for &id in &current {
                for t in self.states[id.index()].transitions() {
                    if let Some(labels) = t.label_set() {
                        if labels.contains(symbol) {
                            next.insert(t.dest);
                        }
                    }
                }
            }
            if next.is_empty() {
                return false;
            }
            current = self.epsilon_closure(&next);
        }
        current.iter().any(|id| self.states[id.index()].accept)
    }

    /// Renumber states in BFS order from the initial state; unreachable
    /// states are dropped and the initial state ends up at index 0.
    /// Successors are visited in ascending order of their transition's
    /// smallest label, so on a DFA the numbering depends only on the graph
    /// shape, not on how states happened to be indexed before. No-op
    /// without an initial state.
    pub fn reindex(&mut self) {
        let Some(init) = self.initial else {
            return;
        };
        let mut order: Vec<StateId> = Vec::with_capacity(self.states.len());
        let mut seen = vec![false; self.states.len()];
        let mut queue = VecDeque::new();
        queue.push_back(init);
        seen[init.index()] = true;
        while let Some(id) = queue.pop_front() {
            order.push(id);
            let mut dests: Vec<(Option<Symbol>, StateId)> = self.states[id.index()]
                .transitions()
                .iter()
                .map(|t| {
                    let first = t
                        .labels
                        .as_ref()
                        .and_then(|l| l.iter().next())
                        .map(|iv| iv.min());
                    (first, t.dest)
                })
                .collect();
            dests.sort_unstable();
            for (_, d) in dests {
                if !seen[d.index()] {
                    seen[d.index()] = true;
                    queue.push_back(d);
                }
            }
        }

        let mut remap = vec![u32::MAX; self.states.len()];
        for (new_idx, old) in order.iter().enumerate() {
            remap[old.index()] = new_idx as u32;
        }

        let mut new_states: Vec<State> = Vec::with_capacity(order.len());
        for old in &order {
            let mut s = self.states[old.index()].clone();
            s.index = StateId(remap[old.index()]);
            s.transitions
                .retain(|t| remap[t.dest.index()] != u32::MAX);
            for t in &mut s.transitions {
                t.orig = s.index;
                t.dest = StateId(remap[t.dest.index()]);
            }
            s.transitions.sort_by_key(|t| t.dest);
            new_states.push(s);
        }
        self.states = new_states;
        self.initial = Some(StateId(0));
    }

    /// States from which an accepting state is reachable, computed by
    /// backward traversal over a reverse-transition index. A state with no
    /// path to acceptance is dead even if forward-reachable from the
    /// initial state.
    pub fn useful_states(&self) -> FxHashSet<StateId> {
        let mut preds: Vec<Vec<StateId>> = vec![Vec::new(); self.states.len()];
        for s in &self.states {
            for t in s.transitions() {
                preds[t.dest.index()].push(s.index);
            }
        }
        let mut useful = FxHashSet::default();
        let mut stack: Vec<StateId> = Vec::new();
        for s in &self.states {
            if s.accept {
                useful.insert(s.index);
                stack.push(s.index);
            }
        }
        while let Some(id) = stack.pop() {
            for &p in &preds[id.index()] {
                if useful.insert(p) {
                    stack.push(p);
                }
            }
        }
        useful
    }

    /// Prune states that cannot reach acceptance: every transition touching
    /// a dead state is removed, then `reindex` compacts the arena.
    pub fn remove_dead_states(&mut self) {
        let useful = self.useful_states();
        for s in &mut self.states {
            if useful.contains(&s.index) {
                s.transitions.retain(|t| useful.contains(&t.dest));
            } else {
                s.transitions.clear();
            }
        }
        self.reindex();
    }

    /// Structural equality: both operands are cloned, pruned of dead
    /// states, and compared state by state, including the full transition
    /// multiset.
    ///
    /// This is isomorphism under identical indexing, **not** language
    /// equivalence: two automata accepting the same language but built
    /// differently will generally compare unequal. Minimize both sides
    /// first when language-level comparison is wanted.
    pub fn structurally_equal(&self, other: &Automaton) -> bool {
        let mut a = self.clone();
        a.remove_dead_states();
        let mut b = other.clone();
        b.remove_dead_states();

        if a.states.len() != b.states.len() || a.initial.is_some() != b.initial.is_some() {
            return false;
        }
        for (sa, sb) in a.states.iter().zip(b.states.iter()) {
            if sa.accept != sb.accept || sa.initial != sb.initial {
                return false;
            }
            if sa.transitions.len() != sb.transitions.len() {
                return false;
            }
            let mut ta = sa.transitions.clone();
            let mut tb = sb.transitions.clone();
            ta.sort_by_key(|t| t.dest);
            tb.sort_by_key(|t| t.dest);
            for (x, y) in ta.iter().zip(tb.iter()) {
                if x.dest != y.dest || x.epsilon != y.epsilon || x.labels != y.labels {
                    return false;
                }
            }
        }
        true
    }

    /// See [`ops::determinize`].
    pub fn determinize(&self) -> Result<Automaton, AutomatonError> {
        ops::determinize(self)
    }

    /// See [`ops::minimize`].
    pub fn minimize(&self) -> Result<Automaton, AutomatonError> {
        ops::minimize(self)
    }

    /// See [`ops::minimize_with`].
    pub fn minimize_with(
        &self,
        algo: ops::MinimizationAlgorithm,
    ) -> Result<Automaton, AutomatonError> {
        ops::minimize_with(self, algo)
    }

    /// See [`ops::revert`].
    pub fn revert(&self) -> Result<Automaton, AutomatonError> {
        ops::revert(self)
    }

    /// See [`ops::concatenate`].
    pub fn concatenate(&self, other: &Automaton) -> Result<Automaton, AutomatonError> {
        ops::concatenate(self, other)
    }

    /// See [`ops::union`].
    pub fn union(&self, other: &Automaton) -> Automaton {
        ops::union(self, other)
    }

    /// See [`ops::complement`].
    pub fn complement(&self) -> Result<Automaton, AutomatonError> {
        ops::complement(self)
    }
}

impl fmt::Display for Automaton {
    /// One transition per line, in state order: the textual dump used for
    /// debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.states {
            let mut trs = s.transitions.clone();
            trs.sort_by_key(|t| t.dest);
            for t in &trs {
                writeln!(
                    f,
                    "{} -> {}{} -> {}",
                    self.states[t.orig.index()],
                    match &t.labels {
                        Some(l) => l.to_string(),
                        None => String::new(),
                    },
                    if t.epsilon { "e" } else { "" },
                    self.states[t.dest.index()],
                )?;
            }
        }
        Ok(())
    }
}
