//! Compile right-linear grammars into finite automata and test membership.
//!
//! A grammar is declared as a set of states, an alphabet, an initial state and
//! productions such as `A -> aB | B | b`. [`Automaton::new`] compiles them into
//! an ε-NFA; [`Automaton::convert`] removes ε-transitions and applies subset
//! construction when needed; [`Automaton::accepts`] answers membership
//! queries at any stage.

pub mod automaton;
pub mod declaration;
mod error;

pub use automaton::{ACCEPT_SINK, Automaton, Stage};
pub use declaration::{Declaration, Value, parse_variables, parse_word_list};
pub use error::{Error, Result};
