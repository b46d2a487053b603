//! Regular expressions over integer symbols.
//!
//! The dialect writes single digits literally and any other `i64` in angle
//! brackets: `"(1|2)*<-7>{2,3}"`. [`compile`] yields the minimal DFA for a
//! pattern; [`compile_nfa`] stops after Thompson construction when the raw
//! epsilon-NFA is wanted.

mod nfa;
mod parser;

pub use nfa::to_nfa;
pub use parser::{parse, RegExp, RegexpError};

use crate::automaton::{self, Automaton};
use crate::AutomatonError;

/// Compile a pattern to an epsilon-NFA, without minimization.
pub fn compile_nfa(pattern: &str) -> Result<Automaton, AutomatonError> {
    let re = parse(pattern)?;
    Ok(to_nfa(&re))
}

/// Compile a pattern to its minimal DFA.
pub fn compile(pattern: &str) -> Result<Automaton, AutomatonError> {
    let nfa = compile_nfa(pattern)?;
    automaton::minimize(&nfa)
}
