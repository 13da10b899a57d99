//! Membership queries.

use crate::automaton::Automaton;
use crate::automaton::state::StateId;
use crate::automaton::symbol::{EPSILON, SymbolId};
use std::collections::HashSet;

impl Automaton {
    /// Check whether `input` belongs to the automaton's language.
    ///
    /// Explores every nondeterministic branch, following symbol transitions
    /// (which consume one character) and ε-transitions (which consume none).
    /// Each `(state, position)` pair is visited at most once, so ε-cycles
    /// terminate. Characters outside the alphabet have no transitions.
    pub fn accepts(&self, input: &str) -> bool {
        let word: Vec<Option<SymbolId>> = input.chars().map(|c| self.symbol_id(c)).collect();

        let mut visited: HashSet<(StateId, usize)> = HashSet::new();
        let mut stack = vec![(self.initial_state, 0)];

        while let Some((state, position)) = stack.pop() {
            if !visited.insert((state, position)) {
                continue;
            }

            if position == word.len() && self.final_states.contains(state) {
                return true;
            }

            if let Some(&Some(symbol)) = word.get(position) {
                if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                    stack.extend(destinations.iter().map(|dest| (dest, position + 1)));
                }
            }

            if let Some(destinations) = self.transitions.get(&(state, EPSILON)) {
                stack.extend(destinations.iter().map(|dest| (dest, position)));
            }
        }

        false
    }
}
