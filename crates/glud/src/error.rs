//! Error types for grammar compilation and declaration reading.

use thiserror::Error;

/// Errors raised while reading a declaration or compiling its productions.
///
/// All of them are construction-time failures: once an [`Automaton`] exists,
/// queries against it cannot fail.
///
/// [`Automaton`]: crate::Automaton
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A production or the header references a state that was not declared.
    #[error("state \"{0}\" not found")]
    UnknownState(String),

    /// A production consumes a symbol that is not part of the alphabet.
    #[error("symbol \"{0}\" not found")]
    UnknownSymbol(String),

    /// A production lacks `->` or one of its alternatives has no valid shape.
    #[error("malformed production \"{0}\"")]
    MalformedProduction(String),

    /// The declaration source could not be read into a value tree.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The value tree does not describe a grammar.
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
