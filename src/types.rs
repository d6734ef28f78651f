//! Token types shared by the lexer, parser and evaluator.
//!
//! Every token is a small `Copy` value: the parse tree, the flattened piece
//! sequences and the evaluator all pass tokens around by value instead of
//! holding references into the source text.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Real;
use crate::functions::{self, Function};

/// A numeric literal as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    /// Literal without fraction or exponent, e.g. `42`.
    Int(i64),
    /// Literal with a fraction or exponent, e.g. `2.5`, `.5`, `1e3`.
    Float(Real),
}

impl Number {
    pub fn value(self) -> Real {
        match self {
            Number::Int(i) => i as Real,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// The five arithmetic operators of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl OperatorKind {
    pub fn symbol(self) -> char {
        match self {
            OperatorKind::Plus => '+',
            OperatorKind::Minus => '-',
            OperatorKind::Times => '*',
            OperatorKind::Divide => '/',
            OperatorKind::Power => '^',
        }
    }

    /// Applies the operator to a single operand.
    ///
    /// Only `+` and `-` have a unary form in the grammar; the others fall
    /// back to returning NaN so a malformed token sequence never panics.
    pub fn apply_unary(self, operand: Real) -> Real {
        match self {
            OperatorKind::Plus => operand,
            OperatorKind::Minus => -operand,
            _ => Real::NAN,
        }
    }

    pub fn apply_binary(self, left: Real, right: Real) -> Real {
        match self {
            OperatorKind::Plus => left + right,
            OperatorKind::Minus => left - right,
            OperatorKind::Times => left * right,
            OperatorKind::Divide => left / right,
            OperatorKind::Power => functions::pow(left, right),
        }
    }
}

/// Number of operands an operator takes.
///
/// The lexer cannot tell `-x` from `a - x`; arity is fixed by the parser
/// when it reduces the production the operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    Unary,
    Binary,
}

/// An operator token together with the facts the parser learned about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    pub kind: OperatorKind,
    pub arity: Arity,
    /// Set on the synthetic `+` the parser creates for `- -` and `a - - b`.
    pub double_negative: bool,
}

impl Operator {
    /// An operator straight out of the lexer, assumed binary until reduced.
    pub fn new(kind: OperatorKind) -> Self {
        Operator {
            kind,
            arity: Arity::Binary,
            double_negative: false,
        }
    }

    pub fn apply_unary(self, operand: Real) -> Real {
        self.kind.apply_unary(operand)
    }

    pub fn apply_binary(self, left: Real, right: Real) -> Real {
        self.kind.apply_binary(left, right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bracket {
    LeftRound,
    RightRound,
    LeftSquare,
    RightSquare,
}

impl Bracket {
    pub fn symbol(self) -> char {
        match self {
            Bracket::LeftRound => '(',
            Bracket::RightRound => ')',
            Bracket::LeftSquare => '[',
            Bracket::RightSquare => ']',
        }
    }

    /// True for `(` and `)`, which exclude the bound they enclose.
    pub fn is_open_bound(self) -> bool {
        matches!(self, Bracket::LeftRound | Bracket::RightRound)
    }
}

/// Separators that structure a formula into pieces, domains and ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Isolator {
    Comma,
    Colon,
    Semicolon,
    VerticalBar,
}

impl Isolator {
    pub fn symbol(self) -> char {
        match self {
            Isolator::Comma => ',',
            Isolator::Colon => ':',
            Isolator::Semicolon => ';',
            Isolator::VerticalBar => '|',
        }
    }
}

/// Classification of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    Number(Number),
    /// A single lowercase letter `a`..`z`.
    Variable(char),
    Function(Function),
    Operator(Operator),
    Bracket(Bracket),
    Isolator(Isolator),
    /// A `.` that does not start a number. No production accepts it.
    Dot,
    /// Synthetic token for an input that is empty after whitespace.
    Empty,
    /// End of input.
    End,
}

/// A token produced by the lexer, with its 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, column: u32) -> Self {
        Token { kind, line, column }
    }

    /// Returns the operator carried by this token, if any.
    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn bracket(&self) -> Option<Bracket> {
        match self.kind {
            TokenKind::Bracket(b) => Some(b),
            _ => None,
        }
    }

    pub fn isolator(&self) -> Option<Isolator> {
        match self.kind {
            TokenKind::Isolator(i) => Some(i),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Variable(c) => write!(f, "{}", c),
            TokenKind::Function(func) => f.write_str(func.name()),
            TokenKind::Operator(op) => write!(f, "{}", op.kind.symbol()),
            TokenKind::Bracket(b) => write!(f, "{}", b.symbol()),
            TokenKind::Isolator(i) => write!(f, "{}", i.symbol()),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Empty => f.write_str("EMPTY"),
            TokenKind::End => f.write_str("end of input"),
        }
    }
}
