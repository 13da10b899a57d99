//! Finite automata compiled from right-linear grammars.
//!
//! This module provides the automaton engine:
//! - Rule compilation from `origin -> alt | alt` productions
//! - Membership queries over ε-NFAs, NFAs and DFAs alike
//! - ε-transition elimination via ε-closures
//! - Subset construction (NFA to DFA conversion)
//!
//! An [`Automaton`] moves through the [`Stage`]s in order, and each stage only
//! does work when the automaton needs it:
//!
//! ```
//! use glud::{Automaton, Declaration, Stage};
//!
//! let declaration = Declaration::new(
//!     "G",
//!     ["A", "B", "C"],
//!     ['a', 'b'],
//!     "A",
//!     ["A -> aB | B", "B -> bC | b", "C -> a"],
//! );
//! let mut automaton = Automaton::new(&declaration).unwrap();
//! assert!(automaton.accepts("ab"));
//!
//! assert_eq!(automaton.convert(), Stage::Deterministic);
//! assert!(automaton.removed_epsilon() && automaton.determinized());
//! assert!(automaton.accepts("ab"));
//! assert!(!automaton.accepts("abb"));
//! ```

mod accept;
mod epsilon;
mod rules;
mod state;
mod subset_construction;
mod symbol;

pub use rules::ACCEPT_SINK;
pub use state::{StateId, StateSet};
pub use symbol::{EPSILON, SymbolId};

use crate::declaration::Declaration;
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use symbol::{EPSILON_GLYPH, is_epsilon};
use tracing::debug;

/// Where an automaton is in the conversion pipeline. Stages only move
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// As compiled from the productions; may contain ε-transitions.
    Raw,
    /// No ε-transitions remain.
    EpsilonFree,
    /// Every (state, symbol) pair has at most one destination.
    Deterministic,
}

/// A finite automaton over single-character symbols.
#[derive(Debug, Clone)]
pub struct Automaton {
    name: String,
    /// State labels, indexed by `StateId`.
    states: IndexSet<String>,
    /// Alphabet, indexed by `SymbolId`.
    alphabet: IndexSet<char>,
    /// (source, symbol) -> destinations; `symbol == EPSILON` for ε-moves.
    transitions: IndexMap<(StateId, SymbolId), StateSet>,
    initial_state: StateId,
    final_states: StateSet,
    stage: Stage,
    removed_epsilon: bool,
    determinized: bool,
}

impl Automaton {
    /// Compile a declaration into a raw automaton.
    pub fn new(declaration: &Declaration) -> Result<Self> {
        let states = intern_states(&declaration.states)?;
        let alphabet = intern_alphabet(&declaration.alphabet)?;
        let initial_state = states
            .get_index_of(declaration.initial_state.as_str())
            .ok_or_else(|| Error::UnknownState(declaration.initial_state.clone()))?
            as StateId;

        let compiled = rules::compile(&states, &alphabet, &declaration.productions)?;
        let final_states = compiled.final_states.iter().copied().collect();

        let automaton = Self {
            name: declaration.name.clone(),
            states: compiled.states,
            alphabet,
            transitions: compiled.transitions,
            initial_state,
            final_states,
            stage: Stage::Raw,
            removed_epsilon: false,
            determinized: false,
        };
        debug!(
            name = %automaton.name,
            states = automaton.states.len(),
            transitions = automaton.transitions.len(),
            "compiled automaton"
        );
        Ok(automaton)
    }

    /// Run every stage that is still pending and return the final stage,
    /// which is always [`Stage::Deterministic`].
    pub fn convert(&mut self) -> Stage {
        loop {
            match self.stage {
                Stage::Raw => {
                    if self.has_epsilon_transitions() {
                        self.eliminate_epsilon();
                    } else {
                        debug!(name = %self.name, "no ε-transitions, skipping elimination");
                        self.stage = Stage::EpsilonFree;
                    }
                }
                Stage::EpsilonFree => {
                    if self.is_deterministic() {
                        debug!(name = %self.name, "already deterministic");
                        self.stage = Stage::Deterministic;
                    } else {
                        self.determinize();
                    }
                }
                Stage::Deterministic => return self.stage,
            }
        }
    }

    /// Name of the grammar the automaton was compiled from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current pipeline stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether ε-elimination actually ran.
    pub fn removed_epsilon(&self) -> bool {
        self.removed_epsilon
    }

    /// Whether subset construction ran on a nondeterministic automaton.
    pub fn determinized(&self) -> bool {
        self.determinized
    }

    /// State labels in id order; `q0, q1, …` once determinized.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter().map(String::as_str)
    }

    /// Alphabet symbols in declaration order.
    pub fn alphabet(&self) -> impl Iterator<Item = char> + '_ {
        self.alphabet.iter().copied()
    }

    /// Label of the initial state.
    pub fn initial_state(&self) -> &str {
        self.label(self.initial_state)
    }

    /// Labels of the final states, in id order.
    pub fn final_states(&self) -> impl Iterator<Item = &str> + '_ {
        self.final_states.iter().map(|id| self.label(id))
    }

    /// Check if `state` is a final state. Unknown labels are not final.
    pub fn is_final(&self, state: &str) -> bool {
        self.state_id(state)
            .is_some_and(|id| self.final_states.contains(id))
    }

    /// Destinations of `state` on `symbol`, or on ε when `symbol` is `None`.
    pub fn destinations(&self, state: &str, symbol: Option<char>) -> Vec<&str> {
        let Some(source) = self.state_id(state) else {
            return Vec::new();
        };
        let symbol = match symbol {
            Some(c) => match self.symbol_id(c) {
                Some(id) => id,
                None => return Vec::new(),
            },
            None => EPSILON,
        };
        self.transitions
            .get(&(source, symbol))
            .map(|dests| dests.iter().map(|id| self.label(id)).collect())
            .unwrap_or_default()
    }

    /// All transitions as `(source, symbol, destinations)`, `None` meaning ε.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, Option<char>, Vec<&str>)> + '_ {
        self.transitions.iter().map(|(&(source, symbol), dests)| {
            (
                self.label(source),
                self.symbol_char(symbol),
                dests.iter().map(|id| self.label(id)).collect(),
            )
        })
    }

    /// Whether any ε-transition is left.
    pub fn has_epsilon_transitions(&self) -> bool {
        self.transitions.keys().any(|&(_, symbol)| is_epsilon(symbol))
    }

    /// No ε-transitions and no (state, symbol) pair with several destinations.
    pub fn is_deterministic(&self) -> bool {
        self.transitions
            .iter()
            .all(|(&(_, symbol), dests)| !is_epsilon(symbol) && dests.len() <= 1)
    }

    fn label(&self, state: StateId) -> &str {
        self.states
            .get_index(state as usize)
            .map_or("?", String::as_str)
    }

    fn state_id(&self, label: &str) -> Option<StateId> {
        self.states.get_index_of(label).map(|i| i as StateId)
    }

    fn symbol_id(&self, symbol: char) -> Option<SymbolId> {
        self.alphabet.get_index_of(&symbol).map(|i| i as SymbolId)
    }

    fn symbol_char(&self, symbol: SymbolId) -> Option<char> {
        if is_epsilon(symbol) {
            None
        } else {
            self.alphabet.get_index(symbol as usize).copied()
        }
    }
}

fn intern_states(names: &[String]) -> Result<IndexSet<String>> {
    let mut states = IndexSet::with_capacity(names.len());
    for name in names {
        if name.is_empty() || name == ACCEPT_SINK {
            return Err(Error::InvalidDeclaration(format!(
                "\"{name}\" cannot be used as a state name"
            )));
        }
        if !states.insert(name.clone()) {
            return Err(Error::InvalidDeclaration(format!(
                "state \"{name}\" declared twice"
            )));
        }
    }
    Ok(states)
}

fn intern_alphabet(symbols: &[char]) -> Result<IndexSet<char>> {
    let mut alphabet = IndexSet::with_capacity(symbols.len());
    for &symbol in symbols {
        if !alphabet.insert(symbol) {
            return Err(Error::InvalidDeclaration(format!(
                "symbol \"{symbol}\" declared twice"
            )));
        }
    }
    Ok(alphabet)
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |items: Vec<String>| items.join(", ");

        writeln!(f, "States: [{}]", join(self.states().map(str::to_string).collect()))?;
        writeln!(
            f,
            "Alphabet: [{}]",
            join(self.alphabet().map(String::from).collect())
        )?;
        writeln!(f, "Transitions:")?;
        for (source, symbol, dests) in self.transitions() {
            writeln!(
                f,
                "  ({source}, {}) -> {{{}}}",
                symbol.unwrap_or(EPSILON_GLYPH),
                dests.join(", ")
            )?;
        }
        writeln!(f, "Initial state: {}", self.initial_state())?;
        writeln!(
            f,
            "Final states: [{}]",
            join(self.final_states().map(str::to_string).collect())
        )
    }
}
