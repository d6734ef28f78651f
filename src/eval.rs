//! Stack-machine evaluation of post-order token sequences.
//!
//! Evaluation never fails: every malformed or undefined case yields NaN and
//! IEEE infinities and NaNs flow through the arithmetic unchanged.

use crate::Real;
use crate::types::{Arity, Token, TokenKind};

/// Evaluates a post-order token sequence.
///
/// `ordinal` maps a variable letter to its 1-based position in `values`.
/// A variable without an ordinal, or whose ordinal lies beyond `values`,
/// evaluates to NaN.
pub fn evaluate_tokens<F>(tokens: &[Token], ordinal: F, values: &[Real]) -> Real
where
    F: Fn(char) -> Option<usize>,
{
    let mut stack: Vec<Real> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let value = match token.kind {
            TokenKind::Number(n) => n.value(),
            TokenKind::Variable(letter) => ordinal(letter)
                .and_then(|o| o.checked_sub(1))
                .and_then(|i| values.get(i))
                .copied()
                .unwrap_or(Real::NAN),
            TokenKind::Operator(op) => match op.arity {
                Arity::Unary => {
                    let Some(operand) = stack.pop() else {
                        return Real::NAN;
                    };
                    op.apply_unary(operand)
                }
                Arity::Binary => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Real::NAN;
                    };
                    op.apply_binary(left, right)
                }
            },
            TokenKind::Function(function) => {
                let Some(argument) = stack.pop() else {
                    return Real::NAN;
                };
                function.apply(argument)
            }
            TokenKind::Empty => Real::NAN,
            TokenKind::Bracket(_) | TokenKind::Isolator(_) | TokenKind::Dot | TokenKind::End => {
                return Real::NAN;
            }
        };
        stack.push(value);
    }
    match stack.as_slice() {
        [result] => *result,
        _ => Real::NAN,
    }
}

/// Evaluates a sequence that contains no variables.
pub fn evaluate_constant(tokens: &[Token]) -> Real {
    evaluate_tokens(tokens, |_| None, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::parser::parse;
    use crate::visitor::linearize;
    use bumpalo::Bump;

    fn eval_with(source: &str, values: &[Real]) -> Real {
        let arena = Bump::new();
        let root = parse(source, &arena).unwrap();
        let tokens = linearize(root);
        // alphabetical ordinals over the letters that occur
        let mut letters: Vec<char> = tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::Variable(c) => Some(c),
                _ => None,
            })
            .collect();
        letters.sort();
        letters.dedup();
        evaluate_tokens(
            &tokens,
            |c| letters.iter().position(|l| *l == c).map(|p| p + 1),
            values,
        )
    }

    fn eval(source: &str) -> Real {
        eval_with(source, &[])
    }

    #[test]
    fn test_arithmetic() {
        assert_approx_eq!(eval("1+2*3"), 7.0);
        assert_approx_eq!(eval("(1+2)*3"), 9.0);
        assert_approx_eq!(eval("10/4-1"), 1.5);
        assert_approx_eq!(eval("2^3^2"), 512.0);
        assert_approx_eq!(eval("-2^2"), -4.0);
        assert_approx_eq!(eval("8/2/2"), 2.0);
        assert_approx_eq!(eval("7-2-1"), 4.0);
    }

    #[test]
    fn test_sign_sequences() {
        assert_approx_eq!(eval("--3"), 3.0);
        assert_approx_eq!(eval("5--3"), 8.0);
        assert_approx_eq!(eval("5+-3"), 2.0);
        assert_approx_eq!(eval("5-+3"), 2.0);
        assert_approx_eq!(eval("+4"), 4.0);
    }

    #[test]
    fn test_functions() {
        assert_approx_eq!(eval("sqrt(16)+abs(-2)"), 6.0);
        assert_approx_eq!(eval("fac(4)"), 24.0);
        assert_approx_eq!(eval("ln(exp(2))"), 2.0);
        assert!(eval("sqrt(-1)").is_nan());
    }

    #[test]
    fn test_variables_bind_by_ordinal() {
        assert_approx_eq!(eval_with("b^2", &[3.0]), 9.0);
        assert_approx_eq!(eval_with("y-x", &[1.0, 5.0]), 4.0);
        assert!(eval_with("x+y", &[1.0]).is_nan());
    }

    #[test]
    fn test_ieee_values_pass_through() {
        assert_eq!(eval("1/0"), Real::INFINITY);
        assert_eq!(eval("-1/0"), Real::NEG_INFINITY);
        assert!(eval("0/0").is_nan());
    }

    #[test]
    fn test_malformed_sequences_are_nan() {
        let arena = Bump::new();
        let tokens = linearize(parse("1+2", &arena).unwrap());
        assert!(evaluate_constant(&tokens[..2]).is_nan());
        assert!(evaluate_constant(&tokens[2..]).is_nan());
        assert!(evaluate_constant(&[]).is_nan());
        assert!(eval("").is_nan());
    }
}
