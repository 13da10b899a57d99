//! Reader for `name = value` declaration files.
//!
//! ```text
//! # comments run to the end of the line unless inside double quotes
//! G = ({A, B, C}, {a, b}, P, A)
//! P = {
//!     A -> aB | B,
//!     B -> bC | b,
//!     C -> a
//! }
//! ```
//!
//! A value opening with `{` or `(` is a sequence and may span several lines
//! until its brackets balance. Scalars are quoted strings, integers or bare
//! text. Lines that do not look like an assignment are skipped.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt;
use tracing::trace;

/// A node of the value tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    List(Vec<Value>),
}

impl Value {
    /// Scalar content as text. Integers are rendered back in decimal so a
    /// state or symbol written as `1` is still usable as a name.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::List(items) => {
                f.write_str("{")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Read every `name = value` assignment in `source`, in order of appearance.
/// A later assignment to the same name replaces the earlier value.
pub fn parse_variables(source: &str) -> Result<IndexMap<String, Value>> {
    let mut variables = IndexMap::new();
    let mut lines = source.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        let Some((name, value)) = split_assignment(line) else {
            trace!(line = line_no, "skipping line without assignment");
            continue;
        };

        let mut text = value.to_string();
        if is_sequence(&text) {
            while !is_balanced(&text) {
                let Some((_, next)) = lines.next() else {
                    return Err(Error::Syntax {
                        line: line_no,
                        message: format!("unbalanced brackets in value of `{name}`"),
                    });
                };
                let next = strip_comment(next);
                if !next.is_empty() {
                    text.push(' ');
                    text.push_str(next);
                }
            }
        }

        let value = parse_value(&text).map_err(|message| Error::Syntax {
            line: line_no,
            message,
        })?;
        trace!(variable = name, %value, "read variable");
        variables.insert(name.to_string(), value);
    }

    Ok(variables)
}

/// Drop everything from the first `#` outside double quotes.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return line[..idx].trim(),
            _ => {}
        }
    }
    line.trim()
}

/// Match `identifier = value` with a non-empty value.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim();
    let value = value.trim();
    let is_identifier = !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    (is_identifier && !value.is_empty()).then_some((name, value))
}

fn is_sequence(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('(')
}

fn closing_of(open: char) -> char {
    if open == '{' { '}' } else { ')' }
}

/// Whether `(` / `{` pairs are balanced and properly nested, ignoring
/// anything inside double quotes.
fn is_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_quotes = false;
    for ch in text.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '(' | '{' => stack.push(closing_of(ch)),
            ')' | '}' => {
                if stack.pop() != Some(ch) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

fn parse_value(text: &str) -> std::result::Result<Value, String> {
    let text = text.trim();
    let Some(open) = text.chars().next().filter(|&c| c == '{' || c == '(') else {
        return Ok(parse_scalar(text));
    };

    let (inner, trailing) = split_sequence(text, closing_of(open))?;
    if !trailing.trim().is_empty() {
        return Err(format!("unexpected `{}` after sequence", trailing.trim()));
    }

    split_elements(inner)
        .into_iter()
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(parse_value)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Split `{...}rest` into the bracket contents and `rest`.
fn split_sequence(text: &str, close: char) -> std::result::Result<(&str, &str), String> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '(' | '{' => depth += 1,
            ')' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if ch != close {
                        return Err(format!("expected `{close}`, found `{ch}`"));
                    }
                    return Ok((&text[1..idx], &text[idx + ch.len_utf8()..]));
                }
            }
            _ => {}
        }
    }
    Err(format!("missing `{close}`"))
}

/// Split on commas that are neither nested nor quoted.
fn split_elements(inner: &str) -> Vec<&str> {
    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                elements.push(&inner[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    elements.push(&inner[start..]);
    elements
}

fn parse_scalar(text: &str) -> Value {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Value::Str(text[1..text.len() - 1].to_string());
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(int) = text.parse() {
            return Value::Int(int);
        }
    }
    Value::Str(text.to_string())
}
