//! Flattening of parse trees into per-piece token sequences.
//!
//! A piecewise formula `f1 : D1 ; f2 : D2 ; g` parses into a chain of `;`
//! nodes whose leaves are `:` nodes plus an optional trailing term. The
//! flattener walks that chain and linearises each function and domain
//! subtree in post-order, which is the order the evaluator consumes.

use log::debug;

use crate::node::Node;
use crate::types::{Isolator, Token};

/// Tokens of one piece before its domain is turned into intervals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieceTokens {
    /// The function body in post-order.
    pub function: Vec<Token>,
    /// The domain in post-order; empty when the piece is unconstrained.
    pub domain: Vec<Token>,
}

/// Splits a tree into its pieces, in declaration order.
///
/// A tree without any `:` node is a single unconstrained piece.
pub fn flatten(root: &Node<'_>) -> Vec<PieceTokens> {
    let mut pieces = Vec::new();
    // (node, trailing): trailing marks the unconstrained last term of a list
    let mut stack: Vec<(&Node<'_>, bool)> = vec![(root, false)];

    while let Some((node, trailing)) = stack.pop() {
        if trailing {
            pieces.push(PieceTokens {
                function: linearize(node),
                domain: Vec::new(),
            });
        } else if node.is_isolator(Isolator::Colon) {
            let [function, domain] = node.children() else {
                continue;
            };
            pieces.push(PieceTokens {
                function: linearize(function),
                domain: linearize(domain),
            });
        } else if node.is_isolator(Isolator::Semicolon) {
            let [left, right] = node.children() else {
                continue;
            };
            // right first so the left side is visited first
            stack.push((*right, !right.is_isolator(Isolator::Colon)));
            stack.push((*left, false));
        }
    }

    if pieces.is_empty() {
        pieces.push(PieceTokens {
            function: linearize(root),
            domain: Vec::new(),
        });
    }
    debug!("flattened tree into {} pieces", pieces.len());
    pieces
}

enum Visit<'n, 'a> {
    Enter(&'n Node<'a>),
    Emit(Token),
}

/// Post-order token sequence of a subtree.
///
/// Children come before the node's own token. For a function term the
/// argument is emitted first and the function token last, so a single
/// value stack can evaluate the result.
pub fn linearize(node: &Node<'_>) -> Vec<Token> {
    let mut out = Vec::new();
    let mut stack = vec![Visit::Enter(node)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Emit(token) => out.push(token),
            Visit::Enter(node) => {
                stack.push(Visit::Emit(*node.token()));
                match node {
                    Node::FunctionTerm { parts: [_, argument] } => {
                        stack.push(Visit::Enter(*argument));
                    }
                    _ => {
                        for child in node.children().iter().rev() {
                            stack.push(Visit::Enter(*child));
                        }
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use bumpalo::Bump;

    fn render(tokens: &[Token]) -> String {
        tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn pieces(source: &str) -> Vec<(String, String)> {
        let arena = Bump::new();
        let root = parse(source, &arena).unwrap();
        flatten(root)
            .iter()
            .map(|p| (render(&p.function), render(&p.domain)))
            .collect()
    }

    #[test]
    fn test_single_term_is_one_piece() {
        assert_eq!(
            pieces("1+2*x"),
            vec![("1 2 x * +".to_string(), String::new())]
        );
    }

    #[test]
    fn test_function_argument_precedes_function() {
        assert_eq!(pieces("sin(x)^2")[0].0, "x sin 2 ^");
        assert_eq!(pieces("-sqrt(4)")[0].0, "4 sqrt -");
    }

    #[test]
    fn test_brackets_are_dropped_from_terms() {
        assert_eq!(pieces("(1+2)*3")[0].0, "1 2 + 3 *");
    }

    #[test]
    fn test_piece_order_and_trailing_term() {
        let got = pieces("x:(0,1);2*x:[1,2];-x");
        assert_eq!(
            got,
            vec![
                ("x".to_string(), "0 ( 1 ) ,".to_string()),
                ("2 x *".to_string(), "1 [ 2 ] ,".to_string()),
                ("x -".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_list_without_trailing_term() {
        let got = pieces("x:(0,1);y:(1,2)");
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].0, "y");
    }

    #[test]
    fn test_domain_with_union_and_expressions() {
        let got = pieces("x*y:(-1,sqrt(4)]|[2,3)");
        assert_eq!(got[0].1, "1 - ( 4 sqrt ] , 2 [ 3 ) , |");
    }
}
