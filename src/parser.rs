//! Table-driven shift/reduce parser.
//!
//! The parser pulls tokens from a [`Lexer`] and consults the shared
//! [`TABLE`](crate::table::TABLE). Each reduce runs the production's
//! [`Reduction`] to build a tree node in the caller's arena.

use bumpalo::Bump;
use log::trace;

use crate::error::{ParseError, Result};
use crate::grammar::{PRODUCTIONS, Production, Reduction, Terminal};
use crate::lexer::Lexer;
use crate::node::Node;
use crate::table::{Action, ParseTable, TABLE};
use crate::types::{Arity, Operator, OperatorKind, Token, TokenKind};

/// An entry of the value stack: a shifted token or a reduced subtree.
#[derive(Debug, Clone, Copy)]
enum StackValue<'a> {
    Token(Token),
    Node(&'a Node<'a>),
}

pub struct Parser<'a, 'src> {
    lexer: Lexer<'src>,
    arena: &'a Bump,
    table: &'static ParseTable,
    states: Vec<usize>,
    values: Vec<StackValue<'a>>,
}

/// Parses `source` into a tree allocated in `arena`.
pub fn parse<'a>(source: &str, arena: &'a Bump) -> Result<&'a Node<'a>> {
    Parser::new(Lexer::new(source), arena).parse()
}

impl<'a, 'src> Parser<'a, 'src> {
    pub fn new(lexer: Lexer<'src>, arena: &'a Bump) -> Self {
        let table: &'static ParseTable = &TABLE;
        Parser {
            lexer,
            arena,
            table,
            states: vec![table.start_state()],
            values: Vec::new(),
        }
    }

    /// Runs the automaton until the input is accepted or rejected.
    pub fn parse(mut self) -> Result<&'a Node<'a>> {
        let mut lookahead = self.lexer.next_token()?;
        loop {
            let state = *self
                .states
                .last()
                .ok_or(ParseError::Internal("empty state stack"))?;
            let terminal = Terminal::of(&lookahead.kind);
            match self.table.action(state, terminal) {
                Action::Shift(next) => {
                    trace!("Shift {} -> state {}", terminal, next);
                    self.values.push(StackValue::Token(lookahead));
                    self.states.push(next);
                    lookahead = self.lexer.next_token()?;
                }
                Action::Reduce(index) => {
                    let production = &PRODUCTIONS[index];
                    trace!("Reduce {}: {}", index, production);
                    self.reduce(production)?;
                }
                Action::Accept => {
                    trace!("Accept");
                    return match self.values.pop() {
                        Some(StackValue::Node(root)) if self.values.is_empty() => Ok(root),
                        _ => Err(ParseError::Internal("accept without a single tree").into()),
                    };
                }
                Action::Error => {
                    return Err(ParseError::UnexpectedToken {
                        found: lookahead.to_string(),
                        expected: self.table.expected(state),
                        line: lookahead.line,
                        column: lookahead.column,
                    }
                    .into());
                }
            }
        }
    }

    fn reduce(&mut self, production: &Production) -> Result<()> {
        let len = production.body.len();
        if self.values.len() < len || self.states.len() <= len {
            return Err(ParseError::Internal("stack underflow on reduce").into());
        }
        let body = self.values.split_off(self.values.len() - len);
        self.states.truncate(self.states.len() - len);

        let node = build_node(self.arena, production.reduction, &body)?;

        let top = *self
            .states
            .last()
            .ok_or(ParseError::Internal("empty state stack"))?;
        let next = self
            .table
            .goto(top, production.lhs)
            .ok_or(ParseError::Internal("missing goto entry"))?;
        self.states.push(next);
        self.values.push(StackValue::Node(node));
        Ok(())
    }
}

fn node_at<'a>(body: &[StackValue<'a>], i: usize) -> Result<&'a Node<'a>> {
    match body.get(i) {
        Some(StackValue::Node(node)) => Ok(*node),
        _ => Err(ParseError::Internal("expected a subtree in reduction body").into()),
    }
}

fn token_at(body: &[StackValue<'_>], i: usize) -> Result<Token> {
    match body.get(i) {
        Some(StackValue::Token(token)) => Ok(*token),
        _ => Err(ParseError::Internal("expected a token in reduction body").into()),
    }
}

/// Marks an operator token with the arity its production gives it.
fn with_arity(mut token: Token, arity: Arity) -> Token {
    if let TokenKind::Operator(op) = &mut token.kind {
        op.arity = arity;
    }
    token
}

/// The `+` that stands in for two consecutive minus signs, placed where
/// the first of them was.
fn double_negative_plus(minus: Token, arity: Arity) -> Token {
    Token::new(
        TokenKind::Operator(Operator {
            kind: OperatorKind::Plus,
            arity,
            double_negative: true,
        }),
        minus.line,
        minus.column,
    )
}

fn build_node<'a>(
    arena: &'a Bump,
    reduction: Reduction,
    body: &[StackValue<'a>],
) -> Result<&'a Node<'a>> {
    let node = match reduction {
        Reduction::PassThrough(i) => return node_at(body, i),
        Reduction::Name => Node::TagName(token_at(body, 0)?),
        Reduction::Value => Node::TagValues(token_at(body, 0)?),
        Reduction::Isolator => Node::IsolatorTerm {
            isolator: token_at(body, 1)?,
            sides: [node_at(body, 0)?, node_at(body, 2)?],
        },
        Reduction::PreOperation => Node::PreOperation {
            operator: with_arity(token_at(body, 0)?, Arity::Unary),
            operand: node_at(body, 1)?,
        },
        Reduction::DoubleNegation => Node::PreOperation {
            operator: double_negative_plus(token_at(body, 0)?, Arity::Unary),
            operand: node_at(body, 2)?,
        },
        Reduction::CenterOperation { operator } => Node::CenterOperation {
            operator: with_arity(token_at(body, operator)?, Arity::Binary),
            operands: [node_at(body, 0)?, node_at(body, body.len() - 1)?],
        },
        Reduction::CenterDoubleNegation => Node::CenterOperation {
            operator: double_negative_plus(token_at(body, 1)?, Arity::Binary),
            operands: [node_at(body, 0)?, node_at(body, 3)?],
        },
        Reduction::LeftRange => Node::RangeTerm {
            bracket: token_at(body, 0)?,
            bound: node_at(body, 1)?,
        },
        Reduction::RightRange => Node::RangeTerm {
            bracket: token_at(body, 1)?,
            bound: node_at(body, 0)?,
        },
        Reduction::FunctionTerm => Node::FunctionTerm {
            parts: [node_at(body, 0)?, node_at(body, 1)?],
        },
    };
    Ok(arena.alloc(node))
}
