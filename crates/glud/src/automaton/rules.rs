//! Compiles right-linear productions into a transition relation.
//!
//! A production has the form `origin -> alt1 | alt2 | ...`. Every alternative
//! is one of three shapes, tried in order:
//!
//! 1. a bare state name `B`, compiled to `origin --ε--> B`;
//! 2. a bare terminal `a`, a quoted terminal `"a"` or nothing at all, which
//!    makes `origin` final and, when a terminal is present, also adds
//!    `origin --a--> ⊥` where `⊥` is an accepting sink;
//! 3. a terminal followed by a state, `aB` or `"a"B`, compiled to
//!    `origin --a--> B`.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{EPSILON, SymbolId};
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

/// Label of the synthesized accepting sink. Reserved: declarations may not
/// use it as a state name.
pub const ACCEPT_SINK: &str = "⊥";

/// Output of [`compile`].
#[derive(Debug, Clone)]
pub(crate) struct CompiledRules {
    /// Declared states, followed by the accepting sink when one was needed.
    pub(crate) states: IndexSet<String>,
    pub(crate) transitions: IndexMap<(StateId, SymbolId), StateSet>,
    /// Final states in order of first appearance.
    pub(crate) final_states: Vec<StateId>,
}

#[derive(Debug, PartialEq, Eq)]
enum Alternative<'a> {
    /// `origin --ε--> state`
    Jump(StateId),
    /// `origin` is final, optionally after consuming one last symbol.
    Accept(Option<SymbolId>),
    /// `origin --symbol--> state`
    Step(SymbolId, &'a str),
}

struct RuleCompiler<'a> {
    states: IndexSet<String>,
    alphabet: &'a IndexSet<char>,
    transitions: IndexMap<(StateId, SymbolId), StateSet>,
    final_states: IndexSet<StateId>,
    sink: Option<StateId>,
}

/// Compile `productions` against the declared `states` and `alphabet`.
///
/// Stops at the first offending production; nothing partial is returned.
pub(crate) fn compile<I, S>(
    states: &IndexSet<String>,
    alphabet: &IndexSet<char>,
    productions: I,
) -> Result<CompiledRules>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut compiler = RuleCompiler {
        states: states.clone(),
        alphabet,
        transitions: IndexMap::new(),
        final_states: IndexSet::new(),
        sink: None,
    };

    for production in productions {
        compiler.compile_production(production.as_ref())?;
    }

    Ok(CompiledRules {
        states: compiler.states,
        transitions: compiler.transitions,
        final_states: compiler.final_states.into_iter().collect(),
    })
}

impl RuleCompiler<'_> {
    fn compile_production(&mut self, production: &str) -> Result<()> {
        let Some((lhs, rhs)) = production.split_once("->") else {
            return Err(Error::MalformedProduction(production.trim().to_string()));
        };
        let origin = self.state_id(lhs.trim())?;

        for alternative in rhs.split('|') {
            match self.classify(alternative.trim(), production)? {
                Alternative::Jump(target) => self.add_transition(origin, EPSILON, target),
                Alternative::Accept(symbol) => {
                    self.final_states.insert(origin);
                    if let Some(symbol) = symbol {
                        let sink = self.accept_sink();
                        self.add_transition(origin, symbol, sink);
                    }
                }
                Alternative::Step(symbol, target) => {
                    let target = self.state_id(target)?;
                    self.add_transition(origin, symbol, target);
                }
            }
        }

        trace!(production = production.trim(), "compiled production");
        Ok(())
    }

    fn classify<'p>(&self, alternative: &'p str, production: &str) -> Result<Alternative<'p>> {
        if let Some(state) = self.declared_state(alternative) {
            return Ok(Alternative::Jump(state));
        }

        if alternative.is_empty() {
            return Ok(Alternative::Accept(None));
        }

        // A lone declared symbol is a bare terminal, even when it is `"`.
        let mut chars = alternative.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Ok(symbol) = self.symbol_id(c) {
                return Ok(Alternative::Accept(Some(symbol)));
            }
        }

        let malformed = || Error::MalformedProduction(production.trim().to_string());
        let (symbol, rest) = split_symbol(alternative)
            .or_else(|| self.alphabet.contains(&'"').then(|| ('"', &alternative[1..])))
            .ok_or_else(malformed)?;
        let symbol = self.symbol_id(symbol)?;
        let rest = rest.trim();

        if rest.is_empty() {
            Ok(Alternative::Accept(Some(symbol)))
        } else {
            Ok(Alternative::Step(symbol, rest))
        }
    }

    fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        let capacity = self.states.len();
        self.transitions
            .entry((source, symbol))
            .or_insert_with(|| StateSet::with_capacity(capacity))
            .insert(destination);
    }

    fn accept_sink(&mut self) -> StateId {
        match self.sink {
            Some(sink) => sink,
            None => {
                let (index, _) = self.states.insert_full(ACCEPT_SINK.to_string());
                let sink = index as StateId;
                self.final_states.insert(sink);
                self.sink = Some(sink);
                sink
            }
        }
    }

    fn declared_state(&self, name: &str) -> Option<StateId> {
        if name == ACCEPT_SINK {
            return None;
        }
        self.states.get_index_of(name).map(|i| i as StateId)
    }

    fn state_id(&self, name: &str) -> Result<StateId> {
        self.declared_state(name)
            .ok_or_else(|| Error::UnknownState(name.to_string()))
    }

    fn symbol_id(&self, symbol: char) -> Result<SymbolId> {
        self.alphabet
            .get_index_of(&symbol)
            .map(|i| i as SymbolId)
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))
    }
}

/// Split the leading terminal, plain (`aB`) or quoted (`"a"B`), off an
/// alternative. Returns `None` for an unterminated quote; the caller falls
/// back to a plain `"` when that character is itself a symbol.
fn split_symbol(alternative: &str) -> Option<(char, &str)> {
    let mut chars = alternative.chars();
    let first = chars.next()?;
    if first != '"' {
        return Some((first, chars.as_str()));
    }
    let quoted = chars.next()?;
    match chars.next() {
        Some('"') => Some((quoted, chars.as_str())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(states: &[&str], alphabet: &str) -> (IndexSet<String>, IndexSet<char>) {
        (
            states.iter().map(|s| s.to_string()).collect(),
            alphabet.chars().collect(),
        )
    }

    fn destinations(rules: &CompiledRules, state: &str, symbol: SymbolId) -> Vec<StateId> {
        let state = rules.states.get_index_of(state).unwrap() as StateId;
        rules
            .transitions
            .get(&(state, symbol))
            .map(StateSet::to_vec)
            .unwrap_or_default()
    }

    #[test]
    fn test_three_alternative_shapes() {
        let (states, alphabet) = declared(&["A", "B", "C"], "ab");
        let rules = compile(&states, &alphabet, ["A -> aB | B", "B -> bC | b", "C -> a"]).unwrap();

        // A=0 B=1 C=2, sink=3
        assert_eq!(rules.states.len(), 4);
        assert_eq!(rules.states.get_index(3).map(String::as_str), Some(ACCEPT_SINK));
        assert_eq!(destinations(&rules, "A", 0), vec![1]);
        assert_eq!(destinations(&rules, "A", EPSILON), vec![1]);
        assert_eq!(destinations(&rules, "B", 1), vec![2, 3]);
        assert_eq!(destinations(&rules, "C", 0), vec![3]);
        assert_eq!(rules.final_states, vec![1, 3, 2]);
    }

    #[test]
    fn test_whitespace_and_empty_alternative() {
        let (states, alphabet) = declared(&["S", "T"], "x");
        let rules = compile(&states, &alphabet, ["  S->xT|  ", "T   ->   "]).unwrap();

        assert_eq!(rules.states.len(), 2, "no sink without a bare terminal");
        assert_eq!(destinations(&rules, "S", 0), vec![1]);
        assert_eq!(rules.final_states, vec![0, 1]);
    }

    #[test]
    fn test_quoted_terminals() {
        // `a` is both a state and a symbol, so the terminal has to be quoted.
        let (states, alphabet) = declared(&["S", "a"], "a");
        let rules = compile(&states, &alphabet, ["S -> a | \"a\" | \"a\"a"]).unwrap();

        assert_eq!(destinations(&rules, "S", EPSILON), vec![1]);
        assert_eq!(destinations(&rules, "S", 0), vec![1, 2]);
        assert_eq!(rules.final_states, vec![0, 2]);
    }

    #[test]
    fn test_quote_as_plain_symbol() {
        let (states, alphabet) = declared(&["A", "B"], "a\"");
        let rules = compile(&states, &alphabet, ["A -> \" | \"B | \"\"\" | \"a\"B"]).unwrap();

        // A=0 B=1, sink=2; `"` is symbol 1.
        assert_eq!(rules.states.get_index(2).map(String::as_str), Some(ACCEPT_SINK));
        assert_eq!(destinations(&rules, "A", 1), vec![1, 2]);
        assert_eq!(destinations(&rules, "A", 0), vec![1]);
        assert_eq!(rules.final_states, vec![0, 2]);
    }

    #[test]
    fn test_duplicate_destinations_collapse() {
        let (states, alphabet) = declared(&["A", "B"], "a");
        let rules = compile(&states, &alphabet, ["A -> aB | aB", "A -> aB"]).unwrap();
        assert_eq!(destinations(&rules, "A", 0), vec![1]);
    }

    #[test]
    fn test_unknown_origin() {
        let (states, alphabet) = declared(&["A"], "a");
        let err = compile(&states, &alphabet, ["X -> a"]).unwrap_err();
        assert_eq!(err, Error::UnknownState("X".to_string()));
    }

    #[test]
    fn test_unknown_destination() {
        let (states, alphabet) = declared(&["A"], "a");
        let err = compile(&states, &alphabet, ["A -> a", "A -> aZ"]).unwrap_err();
        assert_eq!(err, Error::UnknownState("Z".to_string()));
    }

    #[test]
    fn test_unknown_symbol() {
        let (states, alphabet) = declared(&["A", "B"], "a");
        assert_eq!(
            compile(&states, &alphabet, ["A -> cB"]).unwrap_err(),
            Error::UnknownSymbol("c".to_string())
        );
        assert_eq!(
            compile(&states, &alphabet, ["A -> c"]).unwrap_err(),
            Error::UnknownSymbol("c".to_string())
        );
    }

    #[test]
    fn test_malformed_productions() {
        let (states, alphabet) = declared(&["A", "B"], "a");
        assert_eq!(
            compile(&states, &alphabet, ["A aB"]).unwrap_err(),
            Error::MalformedProduction("A aB".to_string())
        );
        assert!(matches!(
            compile(&states, &alphabet, ["A -> \"aB"]),
            Err(Error::MalformedProduction(_))
        ));
    }
}
