//! Grammar declarations.
//!
//! A [`Declaration`] is what the automaton is built from: the state names, the
//! alphabet, the initial state and the productions. It is usually read from a
//! declaration file (see [`value`] for the format) whose first variable is the
//! header `(states, alphabet, productions-name, initial)`:
//!
//! ```
//! use glud::Declaration;
//!
//! let source = "
//!     G = ({A, B}, {a, b}, P, A)
//!     P = { A -> aB | b, B -> b }
//! ";
//! let declaration = Declaration::parse(source).unwrap();
//! assert_eq!(declaration.name, "G");
//! assert_eq!(declaration.productions, ["A -> aB | b", "B -> b"]);
//! ```

pub mod value;

use crate::error::{Error, Result};
pub use value::{Value, parse_variables};
use indexmap::IndexMap;

/// Everything the rule compiler needs to build an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub states: Vec<String>,
    pub alphabet: Vec<char>,
    /// Name of the variable that held the productions (conventionally `P`).
    pub production_marker: String,
    pub initial_state: String,
    pub productions: Vec<String>,
}

impl Declaration {
    /// Build a declaration directly, without going through a source file.
    pub fn new<S, P>(
        name: &str,
        states: impl IntoIterator<Item = S>,
        alphabet: impl IntoIterator<Item = char>,
        initial_state: &str,
        productions: impl IntoIterator<Item = P>,
    ) -> Self
    where
        S: Into<String>,
        P: Into<String>,
    {
        Self {
            name: name.to_string(),
            states: states.into_iter().map(Into::into).collect(),
            alphabet: alphabet.into_iter().collect(),
            production_marker: "P".to_string(),
            initial_state: initial_state.to_string(),
            productions: productions.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a declaration from source text.
    pub fn parse(source: &str) -> Result<Self> {
        Self::from_variables(&parse_variables(source)?)
    }

    /// Interpret a value tree. The first variable is the header; the
    /// productions live in the variable the header names.
    pub fn from_variables(variables: &IndexMap<String, Value>) -> Result<Self> {
        let Some((name, header)) = variables.first() else {
            return Err(invalid("no variables declared"));
        };

        let fields = header
            .as_list()
            .filter(|fields| fields.len() == 4)
            .ok_or_else(|| {
                invalid(format!(
                    "`{name}` must be (states, alphabet, productions, initial)"
                ))
            })?;

        let states = text_list(&fields[0], "states")?;
        let alphabet = text_list(&fields[1], "alphabet")?
            .into_iter()
            .map(|symbol| single_char(&symbol))
            .collect::<Result<Vec<_>>>()?;
        let production_marker = scalar(&fields[2], "production set")?;
        let initial_state = scalar(&fields[3], "initial state")?;

        let productions = variables
            .get(production_marker.as_str())
            .ok_or_else(|| invalid(format!("production list `{production_marker}` not found")))
            .and_then(|value| text_list(value, "productions"))?;

        Ok(Self {
            name: name.clone(),
            states,
            alphabet,
            production_marker,
            initial_state,
            productions,
        })
    }
}

/// Split a word file into words: newlines are dropped, words are comma
/// separated and trimmed.
pub fn parse_word_list(source: &str) -> Vec<String> {
    let joined: String = source
        .trim()
        .chars()
        .filter(|&c| c != '\n' && c != '\r')
        .collect();
    joined.split(',').map(|word| word.trim().to_string()).collect()
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidDeclaration(message.into())
}

fn scalar(value: &Value, what: &str) -> Result<String> {
    value
        .as_text()
        .ok_or_else(|| invalid(format!("{what} must be a single name, found {value}")))
}

fn text_list(value: &Value, what: &str) -> Result<Vec<String>> {
    let items = value
        .as_list()
        .ok_or_else(|| invalid(format!("{what} must be a list, found {value}")))?;
    items.iter().map(|item| scalar(item, what)).collect()
}

fn single_char(symbol: &str) -> Result<char> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(invalid(format!(
            "alphabet symbol \"{symbol}\" must be exactly one character"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_and_productions() {
        let source = r#"
            # right-linear grammar
            MyG = ({A, B, C}, {a, b}, Prods, A)
            Prods = {
                "A -> aB | B",
                B -> bC | b,
                C -> a
            }
        "#;
        let declaration = Declaration::parse(source).unwrap();
        assert_eq!(
            declaration,
            Declaration {
                name: "MyG".to_string(),
                states: vec!["A".into(), "B".into(), "C".into()],
                alphabet: vec!['a', 'b'],
                production_marker: "Prods".to_string(),
                initial_state: "A".to_string(),
                productions: vec![
                    "A -> aB | B".into(),
                    "B -> bC | b".into(),
                    "C -> a".into()
                ],
            }
        );
    }

    #[test]
    fn test_numeric_names() {
        let declaration = Declaration::parse("G = ({0, 1}, {0, 1}, P, 0)\nP = {0 -> 11 | 0}").unwrap();
        assert_eq!(declaration.states, ["0", "1"]);
        assert_eq!(declaration.alphabet, ['0', '1']);
        assert_eq!(declaration.initial_state, "0");
    }

    #[test]
    fn test_missing_production_list() {
        let err = Declaration::parse("G = ({A}, {a}, P, A)").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidDeclaration("production list `P` not found".to_string())
        );
    }

    #[test]
    fn test_bad_header_shape() {
        assert!(matches!(
            Declaration::parse("G = ({A}, {a}, P)\nP = {}"),
            Err(Error::InvalidDeclaration(_))
        ));
        assert!(matches!(
            Declaration::parse("G = ({A}, {ab}, P, A)\nP = {}"),
            Err(Error::InvalidDeclaration(_))
        ));
        assert!(matches!(
            Declaration::parse(""),
            Err(Error::InvalidDeclaration(_))
        ));
    }

    #[test]
    fn test_word_list() {
        assert_eq!(parse_word_list("ab, b,\naba\n"), ["ab", "b", "aba"]);
        assert_eq!(parse_word_list(""), [""]);
        assert_eq!(parse_word_list("a,,b"), ["a", "", "b"]);
    }
}
