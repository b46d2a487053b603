//! Finite automata over the full `i64` alphabet.
//!
//! Transitions carry sets of integer intervals instead of single symbols,
//! so an automaton over an unbounded alphabet stays small: one edge can
//! match "any value in \[3, 2^40\]". The crate provides:
//!
//! - [`Interval`] / [`IntervalSet`]: a normalized interval-set algebra
//! - [`Automaton`]: an arena-based NFA/DFA graph with execution,
//!   determinization, two minimizers, and the usual language operations
//! - [`regexp`]: a regular-expression dialect over integer symbols,
//!   compiled to a minimal DFA
//!
//! ```
//! use intfa::Automaton;
//!
//! let a = Automaton::from_regexp("(1|2)*3").unwrap();
//! assert!(a.run(&[1, 2, 2, 3]));
//! assert!(!a.run(&[1, 2]));
//! ```

use std::fmt;

pub mod automaton;
pub mod interval;
pub mod regexp;

pub use automaton::{
    complement, concatenate, determinize, minimize, minimize_brzozowski, minimize_hopcroft,
    minimize_with, revert, union, Automaton, MinimizationAlgorithm, State, StateId, Transition,
};
pub use interval::{Interval, IntervalSet, Symbol};
pub use regexp::{RegExp, RegexpError};

/// Errors reported by automaton construction and operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutomatonError {
    /// An interval was requested with `min` greater than `max`.
    InvalidRange { min: i64, max: i64 },
    /// The operation needs an initial state and the automaton has none.
    NoInitialState,
    /// The operation is only defined on deterministic automata.
    NotDeterministic,
    /// A regular expression failed to parse.
    Syntax(RegexpError),
}

impl fmt::Display for AutomatonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomatonError::InvalidRange { min, max } => {
                write!(f, "invalid interval bounds: min {} exceeds max {}", min, max)
            }
            AutomatonError::NoInitialState => {
                write!(f, "automaton has no initial state")
            }
            AutomatonError::NotDeterministic => {
                write!(f, "operation requires a deterministic automaton")
            }
            AutomatonError::Syntax(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AutomatonError {}

impl From<RegexpError> for AutomatonError {
    fn from(err: RegexpError) -> Self {
        AutomatonError::Syntax(err)
    }
}
