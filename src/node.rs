//! Parse-tree nodes.
//!
//! Nodes are allocated in a per-parse [`bumpalo::Bump`] arena and refer to
//! their children by shared reference, so a whole tree is released at once
//! when the arena is dropped.

use core::slice;

use crate::types::{Isolator, Token};

/// A node of the formula parse tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    /// Unary `+` or `-` in front of an operand, or a negated range.
    PreOperation {
        operator: Token,
        operand: &'a Node<'a>,
    },
    /// Binary arithmetic: `[left, right]`.
    CenterOperation {
        operator: Token,
        operands: [&'a Node<'a>; 2],
    },
    /// Function application: `[name, argument]`, where `name` is a
    /// [`Node::TagName`] holding the function token.
    FunctionTerm { parts: [&'a Node<'a>; 2] },
    /// One bracketed end of a range, `( bound` or `bound ]`.
    RangeTerm {
        bracket: Token,
        bound: &'a Node<'a>,
    },
    /// `:`, `;`, `|` or `,` joining two subtrees: `[left, right]`.
    IsolatorTerm {
        isolator: Token,
        sides: [&'a Node<'a>; 2],
    },
    /// Identifier leaf: variable, function name or the empty marker.
    TagName(Token),
    /// Constant leaf.
    TagValues(Token),
}

impl<'a> Node<'a> {
    /// The token that glues this node together.
    ///
    /// For a function term this is the function name token.
    pub fn token(&self) -> &Token {
        match self {
            Node::PreOperation { operator, .. } => operator,
            Node::CenterOperation { operator, .. } => operator,
            Node::FunctionTerm { parts } => parts[0].token(),
            Node::RangeTerm { bracket, .. } => bracket,
            Node::IsolatorTerm { isolator, .. } => isolator,
            Node::TagName(token) | Node::TagValues(token) => token,
        }
    }

    pub fn children(&self) -> &[&'a Node<'a>] {
        match self {
            Node::PreOperation { operand, .. } => slice::from_ref(operand),
            Node::RangeTerm { bound, .. } => slice::from_ref(bound),
            Node::CenterOperation { operands, .. } => operands,
            Node::FunctionTerm { parts } => parts,
            Node::IsolatorTerm { sides, .. } => sides,
            Node::TagName(_) | Node::TagValues(_) => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::TagName(_) | Node::TagValues(_))
    }

    /// True for an isolator node carrying `isolator`.
    pub fn is_isolator(&self, isolator: Isolator) -> bool {
        matches!(
            self,
            Node::IsolatorTerm { isolator: token, .. } if token.isolator() == Some(isolator)
        )
    }
}
