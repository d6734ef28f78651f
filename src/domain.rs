//! Conversion of a piece's domain tokens into one interval per variable.
//!
//! Domain tokens arrive in post-order, so a range `(lo, hi]` reads as
//! `lo ( hi ] ,`: bound tokens first, then the bracket that closes the
//! bound, then the comma that joins both ends. Consecutive ranges separated
//! by `|` fill the slots of consecutive variables in ordinal order.

use log::debug;

use crate::Real;
use crate::eval::evaluate_constant;
use crate::interval::Interval;
use crate::types::{Bracket, Isolator, Token, TokenKind};

/// One evaluated end of a range and the bracket that delimited it.
#[derive(Debug, Clone, Copy)]
struct Bound {
    value: Real,
    bracket: Bracket,
}

/// Builds the intervals of a piece with `variables` variables.
///
/// The result always holds `max(variables, 1)` intervals; slots without a
/// range stay unbounded. A negated range is accepted by the grammar but
/// does not change the interval it negates. Ranges beyond the last slot are
/// ignored.
pub fn build_domain(tokens: &[Token], variables: usize) -> Vec<Interval> {
    let slots = variables.max(1);
    let mut domain = vec![Interval::unbounded(); slots];
    let mut assigned = 0;
    let mut operand: Vec<Token> = Vec::new();
    let mut bounds: Vec<Bound> = Vec::new();

    for token in tokens {
        if assigned == slots {
            break;
        }
        match token.kind {
            TokenKind::Bracket(bracket) => {
                bounds.push(Bound {
                    value: evaluate_constant(&operand),
                    bracket,
                });
                operand.clear();
            }
            TokenKind::Isolator(Isolator::Comma) => {
                let (Some(right), Some(left)) = (bounds.pop(), bounds.pop()) else {
                    continue;
                };
                domain[assigned] = Interval::new(
                    left.value,
                    right.value,
                    left.bracket.is_open_bound(),
                    right.bracket.is_open_bound(),
                );
                assigned += 1;
            }
            TokenKind::Isolator(_) => {}
            // an operator with nothing pending is the negation of a whole range
            TokenKind::Operator(_) if operand.is_empty() => {}
            _ => operand.push(*token),
        }
    }

    debug!(
        "domain: [{}]",
        domain
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" x ")
    );
    domain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::visitor::flatten;
    use bumpalo::Bump;

    fn domain_of(source: &str, variables: usize) -> Vec<Interval> {
        let arena = Bump::new();
        let root = parse(source, &arena).unwrap();
        let pieces = flatten(root);
        build_domain(&pieces[0].domain, variables)
    }

    #[test]
    fn test_unconstrained_piece() {
        assert_eq!(domain_of("x", 1), vec![Interval::unbounded()]);
        assert_eq!(domain_of("1", 0), vec![Interval::unbounded()]);
        assert_eq!(domain_of("x*y", 2).len(), 2);
    }

    #[test]
    fn test_bracket_kinds() {
        assert_eq!(
            domain_of("x:(0,10]", 1),
            vec![Interval::new(0.0, 10.0, true, false)]
        );
        assert_eq!(domain_of("x:[0,10)", 1), vec![Interval::new(0.0, 10.0, false, true)]);
    }

    #[test]
    fn test_bounds_are_evaluated() {
        let d = domain_of("x:(-2*3, sqrt(16)+1]", 1);
        assert_eq!(d, vec![Interval::new(-6.0, 5.0, true, false)]);
        let d = domain_of("x:[(1+1)^2, 10]", 1);
        assert_eq!(d[0].low(), 4.0);
    }

    #[test]
    fn test_vertical_bar_fills_consecutive_variables() {
        let d = domain_of("x*y:(0,1)|[2,3]", 2);
        assert_eq!(d, vec![Interval::open(0.0, 1.0), Interval::closed(2.0, 3.0)]);
    }

    #[test]
    fn test_extra_ranges_are_ignored() {
        let d = domain_of("x:(0,1)|[2,3]", 1);
        assert_eq!(d, vec![Interval::open(0.0, 1.0)]);
    }

    #[test]
    fn test_missing_ranges_stay_unbounded() {
        let d = domain_of("x*y*z:(0,1)", 3);
        assert_eq!(d[0], Interval::open(0.0, 1.0));
        assert!(d[1].is_unbounded());
        assert!(d[2].is_unbounded());
    }

    #[test]
    fn test_negated_range_is_kept_as_is() {
        let d = domain_of("x:-(0,1)", 1);
        assert_eq!(d, vec![Interval::open(0.0, 1.0)]);
        let d = domain_of("x:--[-1,1]", 1);
        assert_eq!(d, vec![Interval::closed(-1.0, 1.0)]);
    }

    #[test]
    fn test_reversed_range() {
        let d = domain_of("x:[5,1)", 1);
        assert_eq!(d, vec![Interval::new(1.0, 5.0, true, false)]);
    }
}
