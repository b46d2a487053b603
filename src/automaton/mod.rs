//! The automaton graph model and its algebra.
//!
//! An [`Automaton`] owns an arena of [`State`]s addressed by [`StateId`].
//! Submodules:
//!
//! - `state`: states and merged transitions
//! - `graph`: the arena, execution, reindexing, pruning
//! - `ops`: determinization, minimization, and language operations

mod graph;
pub mod ops;
mod state;

pub use graph::Automaton;
pub use ops::{
    complement, concatenate, determinize, minimize, minimize_brzozowski, minimize_hopcroft,
    minimize_with, revert, union, MinimizationAlgorithm,
};
pub use state::{State, StateId, Transition};
