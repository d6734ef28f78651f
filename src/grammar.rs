//! The formula grammar as static data.
//!
//! Symbols are numbered the way the table builder expects them: nonterminals
//! first (with the augmented start symbol at 0), then terminals, with the
//! end-of-input marker as the very last symbol. Each production also names
//! the tree-building [`Reduction`] the parser runs when it reduces it.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Isolator, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terminal {
    LeftRound,
    RightRound,
    LeftSquare,
    RightSquare,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Minus,
    Plus,
    Times,
    Divide,
    Power,
    VerticalBar,
    Function,
    IntConst,
    FloatConst,
    Variable,
    Empty,
    End,
}

impl Terminal {
    pub const ALL: [Terminal; 20] = [
        Terminal::LeftRound,
        Terminal::RightRound,
        Terminal::LeftSquare,
        Terminal::RightSquare,
        Terminal::Dot,
        Terminal::Comma,
        Terminal::Colon,
        Terminal::Semicolon,
        Terminal::Minus,
        Terminal::Plus,
        Terminal::Times,
        Terminal::Divide,
        Terminal::Power,
        Terminal::VerticalBar,
        Terminal::Function,
        Terminal::IntConst,
        Terminal::FloatConst,
        Terminal::Variable,
        Terminal::Empty,
        Terminal::End,
    ];

    /// The grammar terminal a token is read as.
    pub fn of(kind: &TokenKind) -> Terminal {
        use crate::types::{Bracket, Number, OperatorKind};
        match kind {
            TokenKind::Number(Number::Int(_)) => Terminal::IntConst,
            TokenKind::Number(Number::Float(_)) => Terminal::FloatConst,
            TokenKind::Variable(_) => Terminal::Variable,
            TokenKind::Function(_) => Terminal::Function,
            TokenKind::Operator(op) => match op.kind {
                OperatorKind::Plus => Terminal::Plus,
                OperatorKind::Minus => Terminal::Minus,
                OperatorKind::Times => Terminal::Times,
                OperatorKind::Divide => Terminal::Divide,
                OperatorKind::Power => Terminal::Power,
            },
            TokenKind::Bracket(b) => match b {
                Bracket::LeftRound => Terminal::LeftRound,
                Bracket::RightRound => Terminal::RightRound,
                Bracket::LeftSquare => Terminal::LeftSquare,
                Bracket::RightSquare => Terminal::RightSquare,
            },
            TokenKind::Isolator(i) => match i {
                Isolator::Comma => Terminal::Comma,
                Isolator::Colon => Terminal::Colon,
                Isolator::Semicolon => Terminal::Semicolon,
                Isolator::VerticalBar => Terminal::VerticalBar,
            },
            TokenKind::Dot => Terminal::Dot,
            TokenKind::Empty => Terminal::Empty,
            TokenKind::End => Terminal::End,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Terminal::LeftRound => "(",
            Terminal::RightRound => ")",
            Terminal::LeftSquare => "[",
            Terminal::RightSquare => "]",
            Terminal::Dot => ".",
            Terminal::Comma => ",",
            Terminal::Colon => ":",
            Terminal::Semicolon => ";",
            Terminal::Minus => "-",
            Terminal::Plus => "+",
            Terminal::Times => "*",
            Terminal::Divide => "/",
            Terminal::Power => "^",
            Terminal::VerticalBar => "|",
            Terminal::Function => "FUNCTION",
            Terminal::IntConst => "INTCONST",
            Terminal::FloatConst => "FLOATCONST",
            Terminal::Variable => "VARIABLE",
            Terminal::Empty => "EMPTY",
            Terminal::End => "$END",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    Start,
    Expression,
    TermList,
    TermWithInterval,
    Interval,
    Range,
    LeftRange,
    RightRange,
    Term,
    Addend,
    Factor,
    Variable,
    BracketTerm,
    Atom,
    Function,
    SingleValue,
    IntervalTerm,
    IntervalAddend,
    IntervalFactor,
    IntervalVariable,
    IntervalBracketTerm,
    IntervalAtom,
    IntervalSingleValue,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 23] = [
        NonTerminal::Start,
        NonTerminal::Expression,
        NonTerminal::TermList,
        NonTerminal::TermWithInterval,
        NonTerminal::Interval,
        NonTerminal::Range,
        NonTerminal::LeftRange,
        NonTerminal::RightRange,
        NonTerminal::Term,
        NonTerminal::Addend,
        NonTerminal::Factor,
        NonTerminal::Variable,
        NonTerminal::BracketTerm,
        NonTerminal::Atom,
        NonTerminal::Function,
        NonTerminal::SingleValue,
        NonTerminal::IntervalTerm,
        NonTerminal::IntervalAddend,
        NonTerminal::IntervalFactor,
        NonTerminal::IntervalVariable,
        NonTerminal::IntervalBracketTerm,
        NonTerminal::IntervalAtom,
        NonTerminal::IntervalSingleValue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::Start => "$START$",
            NonTerminal::Expression => "expression",
            NonTerminal::TermList => "term-list",
            NonTerminal::TermWithInterval => "termwithinterval",
            NonTerminal::Interval => "interval",
            NonTerminal::Range => "range",
            NonTerminal::LeftRange => "leftrange",
            NonTerminal::RightRange => "rightrange",
            NonTerminal::Term => "term",
            NonTerminal::Addend => "addend",
            NonTerminal::Factor => "factor",
            NonTerminal::Variable => "variable",
            NonTerminal::BracketTerm => "bracket-term",
            NonTerminal::Atom => "atom",
            NonTerminal::Function => "function",
            NonTerminal::SingleValue => "single-value",
            NonTerminal::IntervalTerm => "interval-term",
            NonTerminal::IntervalAddend => "interval-addend",
            NonTerminal::IntervalFactor => "interval-factor",
            NonTerminal::IntervalVariable => "interval-variable",
            NonTerminal::IntervalBracketTerm => "interval-bracket-term",
            NonTerminal::IntervalAtom => "interval-atom",
            NonTerminal::IntervalSingleValue => "interval-single-value",
        }
    }
}

pub const N_NONTERMINALS: usize = NonTerminal::ALL.len();
pub const N_TERMINALS: usize = Terminal::ALL.len();
pub const N_SYMBOLS: usize = N_NONTERMINALS + N_TERMINALS;

/// A grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    T(Terminal),
    N(NonTerminal),
}

impl Symbol {
    /// Dense index: nonterminals occupy `0..N_NONTERMINALS`, terminals follow.
    pub fn index(self) -> usize {
        match self {
            Symbol::N(n) => n as usize,
            Symbol::T(t) => N_NONTERMINALS + t as usize,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::N(n) => n.name(),
            Symbol::T(t) => t.name(),
        }
    }
}

/// How the parser turns the values of a reduced body into a tree node.
///
/// Positions index into the production body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Reuse the node at this position unchanged.
    PassThrough(usize),
    /// Identifier leaf: variable, function name or the empty marker.
    Name,
    /// Constant leaf.
    Value,
    /// `left <isolator> right`.
    Isolator,
    /// Unary operator at position 0 applied to position 1.
    PreOperation,
    /// `- - x`, rewritten to a flagged unary `+`.
    DoubleNegation,
    /// Binary operator at `operator`, operands at 0 and the last position.
    CenterOperation { operator: usize },
    /// `a - - b`, rewritten to a flagged binary `+`.
    CenterDoubleNegation,
    /// Opening bracket at 0, bound at 1.
    LeftRange,
    /// Bound at 0, closing bracket at 1.
    RightRange,
    /// Function name node at 0, argument node at 1.
    FunctionTerm,
}

#[derive(Debug, Clone, Copy)]
pub struct Production {
    pub lhs: NonTerminal,
    pub body: &'static [Symbol],
    pub reduction: Reduction,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs.name())?;
        for symbol in self.body {
            write!(f, " {}", symbol.name())?;
        }
        Ok(())
    }
}

use NonTerminal as NT;
use Reduction as R;
use Symbol::{N, T};
use Terminal as Tm;

const fn prod(lhs: NonTerminal, body: &'static [Symbol], reduction: Reduction) -> Production {
    Production {
        lhs,
        body,
        reduction,
    }
}

/// All productions, indexed by production number.
pub static PRODUCTIONS: [Production; 60] = [
    // 0
    prod(NT::Start, &[N(NT::Expression)], R::PassThrough(0)),
    prod(NT::Expression, &[N(NT::Term)], R::PassThrough(0)),
    prod(NT::Expression, &[N(NT::TermList)], R::PassThrough(0)),
    prod(
        NT::Expression,
        &[N(NT::TermList), T(Tm::Semicolon), N(NT::Term)],
        R::Isolator,
    ),
    prod(NT::Expression, &[T(Tm::Empty)], R::Name),
    // 5
    prod(NT::TermList, &[N(NT::TermWithInterval)], R::PassThrough(0)),
    prod(
        NT::TermList,
        &[N(NT::TermList), T(Tm::Semicolon), N(NT::TermWithInterval)],
        R::Isolator,
    ),
    prod(
        NT::TermWithInterval,
        &[N(NT::Term), T(Tm::Colon), N(NT::Interval)],
        R::Isolator,
    ),
    prod(NT::Interval, &[N(NT::Range)], R::PassThrough(0)),
    prod(
        NT::Interval,
        &[N(NT::Interval), T(Tm::VerticalBar), N(NT::Range)],
        R::Isolator,
    ),
    // 10
    prod(NT::Range, &[T(Tm::Minus), N(NT::Range)], R::PreOperation),
    prod(
        NT::Range,
        &[N(NT::LeftRange), T(Tm::Comma), N(NT::RightRange)],
        R::Isolator,
    ),
    prod(
        NT::LeftRange,
        &[T(Tm::LeftRound), N(NT::IntervalTerm)],
        R::LeftRange,
    ),
    prod(
        NT::LeftRange,
        &[T(Tm::LeftSquare), N(NT::IntervalTerm)],
        R::LeftRange,
    ),
    prod(
        NT::RightRange,
        &[N(NT::IntervalTerm), T(Tm::RightRound)],
        R::RightRange,
    ),
    // 15
    prod(
        NT::RightRange,
        &[N(NT::IntervalTerm), T(Tm::RightSquare)],
        R::RightRange,
    ),
    prod(
        NT::Term,
        &[N(NT::Term), T(Tm::Plus), N(NT::Addend)],
        R::CenterOperation { operator: 1 },
    ),
    prod(
        NT::Term,
        &[N(NT::Term), T(Tm::Minus), N(NT::Addend)],
        R::CenterOperation { operator: 1 },
    ),
    prod(NT::Term, &[T(Tm::Plus), N(NT::Addend)], R::PreOperation),
    prod(NT::Term, &[T(Tm::Minus), N(NT::Addend)], R::PreOperation),
    // 20
    prod(
        NT::Term,
        &[T(Tm::Minus), T(Tm::Minus), N(NT::Addend)],
        R::DoubleNegation,
    ),
    prod(
        NT::Term,
        &[N(NT::Term), T(Tm::Plus), T(Tm::Minus), N(NT::Addend)],
        R::CenterOperation { operator: 2 },
    ),
    prod(
        NT::Term,
        &[N(NT::Term), T(Tm::Minus), T(Tm::Plus), N(NT::Addend)],
        R::CenterOperation { operator: 1 },
    ),
    prod(
        NT::Term,
        &[N(NT::Term), T(Tm::Minus), T(Tm::Minus), N(NT::Addend)],
        R::CenterDoubleNegation,
    ),
    prod(NT::Term, &[N(NT::Addend)], R::PassThrough(0)),
    // 25
    prod(NT::Addend, &[N(NT::Factor)], R::PassThrough(0)),
    prod(
        NT::Addend,
        &[N(NT::Addend), T(Tm::Times), N(NT::Factor)],
        R::CenterOperation { operator: 1 },
    ),
    prod(
        NT::Addend,
        &[N(NT::Addend), T(Tm::Divide), N(NT::Factor)],
        R::CenterOperation { operator: 1 },
    ),
    prod(NT::Factor, &[N(NT::Variable)], R::PassThrough(0)),
    prod(
        NT::Factor,
        &[N(NT::Variable), T(Tm::Power), N(NT::Factor)],
        R::CenterOperation { operator: 1 },
    ),
    // 30
    prod(NT::Variable, &[N(NT::Atom)], R::PassThrough(0)),
    prod(NT::Variable, &[N(NT::BracketTerm)], R::PassThrough(0)),
    prod(
        NT::BracketTerm,
        &[T(Tm::LeftRound), N(NT::Term), T(Tm::RightRound)],
        R::PassThrough(1),
    ),
    prod(
        NT::Atom,
        &[N(NT::Function), N(NT::BracketTerm)],
        R::FunctionTerm,
    ),
    prod(NT::Atom, &[N(NT::SingleValue)], R::PassThrough(0)),
    // 35
    prod(NT::SingleValue, &[T(Tm::IntConst)], R::Value),
    prod(NT::SingleValue, &[T(Tm::FloatConst)], R::Value),
    prod(NT::SingleValue, &[T(Tm::Variable)], R::Name),
    prod(NT::Function, &[T(Tm::Function)], R::Name),
    prod(
        NT::IntervalTerm,
        &[N(NT::IntervalTerm), T(Tm::Plus), N(NT::IntervalAddend)],
        R::CenterOperation { operator: 1 },
    ),
    // 40
    prod(
        NT::IntervalTerm,
        &[N(NT::IntervalTerm), T(Tm::Minus), N(NT::IntervalAddend)],
        R::CenterOperation { operator: 1 },
    ),
    prod(
        NT::IntervalTerm,
        &[T(Tm::Plus), N(NT::IntervalAddend)],
        R::PreOperation,
    ),
    prod(
        NT::IntervalTerm,
        &[T(Tm::Minus), N(NT::IntervalAddend)],
        R::PreOperation,
    ),
    prod(
        NT::IntervalTerm,
        &[T(Tm::Minus), T(Tm::Minus), N(NT::IntervalAddend)],
        R::DoubleNegation,
    ),
    prod(
        NT::IntervalTerm,
        &[
            N(NT::IntervalTerm),
            T(Tm::Plus),
            T(Tm::Minus),
            N(NT::IntervalAddend),
        ],
        R::CenterOperation { operator: 2 },
    ),
    // 45
    prod(
        NT::IntervalTerm,
        &[
            N(NT::IntervalTerm),
            T(Tm::Minus),
            T(Tm::Plus),
            N(NT::IntervalAddend),
        ],
        R::CenterOperation { operator: 1 },
    ),
    prod(
        NT::IntervalTerm,
        &[
            N(NT::IntervalTerm),
            T(Tm::Minus),
            T(Tm::Minus),
            N(NT::IntervalAddend),
        ],
        R::CenterDoubleNegation,
    ),
    prod(NT::IntervalTerm, &[N(NT::IntervalAddend)], R::PassThrough(0)),
    prod(NT::IntervalAddend, &[N(NT::IntervalFactor)], R::PassThrough(0)),
    prod(
        NT::IntervalAddend,
        &[N(NT::IntervalAddend), T(Tm::Times), N(NT::IntervalFactor)],
        R::CenterOperation { operator: 1 },
    ),
    // 50
    prod(
        NT::IntervalAddend,
        &[N(NT::IntervalAddend), T(Tm::Divide), N(NT::IntervalFactor)],
        R::CenterOperation { operator: 1 },
    ),
    prod(
        NT::IntervalFactor,
        &[N(NT::IntervalVariable)],
        R::PassThrough(0),
    ),
    prod(
        NT::IntervalFactor,
        &[N(NT::IntervalVariable), T(Tm::Power), N(NT::IntervalFactor)],
        R::CenterOperation { operator: 1 },
    ),
    prod(NT::IntervalVariable, &[N(NT::IntervalAtom)], R::PassThrough(0)),
    prod(
        NT::IntervalVariable,
        &[N(NT::IntervalBracketTerm)],
        R::PassThrough(0),
    ),
    // 55
    prod(
        NT::IntervalBracketTerm,
        &[T(Tm::LeftRound), N(NT::IntervalTerm), T(Tm::RightRound)],
        R::PassThrough(1),
    ),
    prod(
        NT::IntervalAtom,
        &[N(NT::Function), N(NT::IntervalBracketTerm)],
        R::FunctionTerm,
    ),
    prod(
        NT::IntervalAtom,
        &[N(NT::IntervalSingleValue)],
        R::PassThrough(0),
    ),
    prod(NT::IntervalSingleValue, &[T(Tm::IntConst)], R::Value),
    prod(NT::IntervalSingleValue, &[T(Tm::FloatConst)], R::Value),
];
