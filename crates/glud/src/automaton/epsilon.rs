//! ε-transition elimination.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{EPSILON, SymbolId};
use crate::automaton::{Automaton, Stage};
use indexmap::IndexMap;
use tracing::{debug, trace};

impl Automaton {
    /// Compute the ε-closure of a single state using DFS.
    /// A state always belongs to its own closure.
    pub(crate) fn epsilon_closure(&self, state: StateId) -> StateSet {
        let mut closure = StateSet::with_capacity(self.states.len());
        let mut stack = vec![state];

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }

            if let Some(destinations) = self.transitions.get(&(s, EPSILON)) {
                stack.extend(destinations.iter().filter(|&dest| !closure.contains(dest)));
            }
        }

        closure
    }

    /// Rewrite the automaton so that no ε-transitions remain.
    ///
    /// A state becomes final when its ε-closure contains a final state, and
    /// on every symbol it reaches the closures of everything its closure
    /// reaches. The language is unchanged. Does nothing besides advancing the
    /// stage when there are no ε-transitions.
    pub fn eliminate_epsilon(&mut self) {
        if self.has_epsilon_transitions() {
            let num_states = self.states.len() as StateId;
            let closures: Vec<StateSet> =
                (0..num_states).map(|state| self.epsilon_closure(state)).collect();

            let final_states: StateSet = (0..num_states)
                .filter(|&state| closures[state as usize].intersects(&self.final_states))
                .collect();

            let mut transitions: IndexMap<(StateId, SymbolId), StateSet> = IndexMap::new();
            for state in 0..num_states {
                for symbol in 0..self.alphabet.len() as SymbolId {
                    let mut reached = StateSet::with_capacity(num_states as usize);
                    for member in closures[state as usize].iter() {
                        if let Some(destinations) = self.transitions.get(&(member, symbol)) {
                            for dest in destinations.iter() {
                                reached.union_with(&closures[dest as usize]);
                            }
                        }
                    }
                    if !reached.is_empty() {
                        trace!(state = self.label(state), ?reached, "ε-free transition");
                        transitions.insert((state, symbol), reached);
                    }
                }
            }

            debug!(
                name = %self.name,
                before = self.transitions.len(),
                after = transitions.len(),
                "eliminated ε-transitions"
            );
            self.transitions = transitions;
            self.final_states = final_states;
            self.removed_epsilon = true;
        }

        self.stage = self.stage.max(Stage::EpsilonFree);
    }
}

#[cfg(test)]
mod tests {
    use crate::{Automaton, Declaration, Stage};

    fn automaton(states: &[&str], alphabet: &str, rules: &[&str]) -> Automaton {
        let declaration = Declaration::new(
            "T",
            states.iter().copied(),
            alphabet.chars(),
            states[0],
            rules.iter().copied(),
        );
        Automaton::new(&declaration).unwrap()
    }

    #[test]
    fn test_epsilon_closure() {
        // A -ε-> B -ε-> C, D unrelated
        let a = automaton(&["A", "B", "C", "D"], "a", &["A -> B", "B -> C", "D -> aA"]);

        assert_eq!(a.epsilon_closure(0).to_vec(), vec![0, 1, 2]);
        assert_eq!(a.epsilon_closure(1).to_vec(), vec![1, 2]);
        assert_eq!(a.epsilon_closure(3).to_vec(), vec![3]);
    }

    #[test]
    fn test_epsilon_closure_with_cycle() {
        let a = automaton(&["A", "B"], "a", &["A -> B", "B -> A"]);
        assert_eq!(a.epsilon_closure(0).to_vec(), vec![0, 1]);
        assert_eq!(a.epsilon_closure(1).to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_elimination_rewrites_relation() {
        let mut a = automaton(&["A", "B", "C"], "ab", &["A -> aB | B", "B -> bC | b", "C -> a"]);
        a.eliminate_epsilon();

        assert_eq!(a.stage(), Stage::EpsilonFree);
        assert!(a.removed_epsilon());
        assert!(!a.has_epsilon_transitions());
        assert_eq!(a.final_states().collect::<Vec<_>>(), ["A", "B", "C", "⊥"]);
        assert_eq!(a.destinations("A", Some('a')), ["B"]);
        assert_eq!(a.destinations("A", Some('b')), ["C", "⊥"]);
        assert_eq!(a.destinations("B", Some('b')), ["C", "⊥"]);
        assert_eq!(a.destinations("C", Some('a')), ["⊥"]);
        assert!(a.destinations("B", Some('a')).is_empty());
        assert_eq!(a.transitions().count(), 4, "empty pairs are omitted");
    }

    #[test]
    fn test_elimination_preserves_language() {
        let rules = ["A -> aB | B", "B -> bC | b | C", "C -> aA | "];
        let raw = automaton(&["A", "B", "C"], "ab", &rules);
        let mut eliminated = raw.clone();
        eliminated.eliminate_epsilon();

        for word in ["", "a", "b", "ab", "ba", "aab", "abab", "bab", "abba", "aaaa"] {
            assert_eq!(raw.accepts(word), eliminated.accepts(word), "{word:?}");
        }
    }

    #[test]
    fn test_noop_without_epsilon() {
        let mut a = automaton(&["A", "B"], "a", &["A -> aB", "B -> a"]);
        let before = a.to_string();
        a.eliminate_epsilon();

        assert_eq!(a.stage(), Stage::EpsilonFree);
        assert!(!a.removed_epsilon());
        assert_eq!(a.to_string(), before);
    }
}
