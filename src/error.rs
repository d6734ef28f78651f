//! Error types for lexing, parsing and fitting expressions.
//!
//! Construction of an [`Expression`](crate::Expression) is the only fallible
//! operation on formulas; evaluation reports undefined results as NaN
//! instead of failing. Errors carry the 1-based line and column of the
//! offending input so callers can point at it.

use thiserror::Error;

use crate::grammar::Terminal;

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, ExpressionError>;

/// Error raised while splitting the source into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A character that starts no token.
    #[error("unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter { character: char, line: u32, column: u32 },

    /// An identifier longer than one letter that is not a library function.
    #[error("unknown identifier '{name}' at line {line}, column {column}")]
    UnknownIdentifier { name: String, line: u32, column: u32 },

    /// Numeric text that does not convert to a number.
    #[error("malformed number '{text}' at line {line}, column {column}")]
    MalformedNumber { text: String, line: u32, column: u32 },

    #[error("token of {length} characters at line {line}, column {column} exceeds the maximum of {max}")]
    TokenTooLong {
        length: usize,
        max: usize,
        line: u32,
        column: u32,
    },
}

/// Error raised by the shift/reduce parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The parse table has no action for the lookahead token.
    #[error("unexpected {found} at line {line}, column {column}, expected one of: {}", join_terminals(.expected))]
    UnexpectedToken {
        found: String,
        expected: Vec<Terminal>,
        line: u32,
        column: u32,
    },

    /// The parser stacks disagree with the grammar tables.
    #[error("internal parser error: {0}")]
    Internal(&'static str),
}

/// Error returned when building an [`Expression`](crate::Expression).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// The source contains a NUL or non-ASCII character.
    #[error("invalid character {character:?} at byte {position}")]
    Validation { position: usize, character: char },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Error returned by the fitting routines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("at least {required} usable points are needed, got {found}")]
    NotEnoughPoints { required: usize, found: usize },

    /// The samples admit no unique fit, e.g. all share the same x.
    #[error("degenerate sample set: {0}")]
    Degenerate(&'static str),

    /// The generated formula was rejected by the parser.
    #[error("generated expression is invalid: {0}")]
    Expression(#[from] ExpressionError),
}

fn join_terminals(terminals: &[Terminal]) -> String {
    terminals
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
