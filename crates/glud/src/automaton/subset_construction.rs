//! Subset construction algorithm for converting an NFA to a DFA.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::SymbolId;
use crate::automaton::{Automaton, Stage};
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Result of the powerset construction, with composite states already
/// relabeled to their discovery index.
struct Subsets {
    /// Composite states in BFS discovery order; the index is the new id.
    composites: IndexSet<StateSet>,
    transitions: IndexMap<(StateId, SymbolId), StateSet>,
    final_states: StateSet,
}

/// Explore the composite states reachable from `{initial}`.
///
/// The worklist is FIFO and symbols are tried in alphabet order, so the same
/// ε-free automaton always yields the same numbering.
fn subset_construction(automaton: &Automaton) -> Subsets {
    let capacity = automaton.states.len();
    let mut composites: IndexSet<StateSet> = IndexSet::new();
    let mut transitions = IndexMap::new();
    let mut worklist: VecDeque<StateId> = VecDeque::new();

    let (initial, _) = composites.insert_full(StateSet::singleton(automaton.initial_state, capacity));
    worklist.push_back(initial as StateId);

    while let Some(current) = worklist.pop_front() {
        for symbol in 0..automaton.alphabet.len() as SymbolId {
            let mut reached = StateSet::with_capacity(capacity);
            if let Some(members) = composites.get_index(current as usize) {
                for member in members.iter() {
                    if let Some(destinations) = automaton.transitions.get(&(member, symbol)) {
                        reached.union_with(destinations);
                    }
                }
            }

            if reached.is_empty() {
                continue;
            }

            let (next, is_new) = composites.insert_full(reached);
            let next = next as StateId;
            if is_new {
                trace!(id = next, "new composite state");
                worklist.push_back(next);
            }
            transitions.insert((current, symbol), StateSet::singleton(next, 1));
        }
    }

    let final_states = composites
        .iter()
        .enumerate()
        .filter(|(_, members)| members.intersects(&automaton.final_states))
        .map(|(id, _)| id as StateId)
        .collect();

    Subsets {
        composites,
        transitions,
        final_states,
    }
}

impl Automaton {
    /// Replace the automaton with an equivalent deterministic one.
    ///
    /// Composite states are named `q0, q1, …` in breadth-first discovery
    /// order, `q0` being the initial state. States unreachable from the
    /// initial state are dropped. Any ε-transitions are eliminated first.
    pub fn determinize(&mut self) {
        if self.has_epsilon_transitions() {
            self.eliminate_epsilon();
        }

        let was_deterministic = self.is_deterministic();
        let subsets = subset_construction(self);

        if tracing::enabled!(tracing::Level::TRACE) {
            for (id, members) in subsets.composites.iter().enumerate() {
                let labels: Vec<&str> = members.iter().map(|m| self.label(m)).collect();
                trace!("q{id} = {{{}}}", labels.join(", "));
            }
        }
        debug!(
            name = %self.name,
            nfa_states = self.states.len(),
            dfa_states = subsets.composites.len(),
            "determinized"
        );

        self.states = (0..subsets.composites.len())
            .map(|id| format!("q{id}"))
            .collect();
        self.transitions = subsets.transitions;
        self.final_states = subsets.final_states;
        self.initial_state = 0;
        self.determinized |= !was_deterministic;
        self.stage = Stage::Deterministic;
    }
}
