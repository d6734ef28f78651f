#![doc = r#"
# plot-expr

A parser and evaluator for piecewise plotting formulas.

## Overview

plot-expr turns user-typed formulas such as `sin(x)*x^2 : (-5,5) ; x+1` into
functions that can be evaluated point by point. A formula is a list of
pieces, each an arithmetic term over single-letter variables optionally
restricted to a domain of intervals, with an optional unrestricted trailing
term.

Key features:
- Hand-written lexer and table-driven SLR(1) shift/reduce parser
- Piecewise definitions with open, closed and half-open intervals
- Multi-variable domains, one range per variable separated by `|`
- A fixed library of one-argument functions (`sin`, `sqrt`, `fac`, `sgn`, ...)
- NaN instead of errors for undefined points, IEEE semantics throughout
- Curve fitting that produces formulas: regressions, splines, interpolation

## Quick Start

```rust
use plot_expr::Expression;

let f = Expression::new("x : (0,10) ; -x", "f").unwrap();
assert_eq!(f.evaluate_at(&[5.0]), 5.0);
assert_eq!(f.evaluate_at(&[-5.0]), 5.0);

// Variables bind in alphabetical order
let g = Expression::new("b^2 - a", "g").unwrap();
assert_eq!(g.number_of_variables(), 2);
assert_eq!(g.evaluate_at(&[1.0, 3.0]), 8.0);
```

## Domains

Each piece may be followed by `:` and one range per variable. A range is
two bounds joined by `,`; `(` and `)` exclude a bound, `[` and `]` include
it. Bounds are constant expressions.

```rust
use plot_expr::Expression;

let f = Expression::new("x*y : [0,1] | (0, sqrt(4)) ; 0", "f").unwrap();
assert_eq!(f.evaluate_at(&[1.0, 1.5]), 1.5);
assert_eq!(f.evaluate_at(&[1.0, 2.0]), 0.0);
```

## Errors

Construction fails on characters outside ASCII, unknown identifiers and
syntax errors. Evaluation never fails:

```rust
use plot_expr::{Expression, ExpressionError};

assert!(matches!(
    Expression::new("1 + + ", "f"),
    Err(ExpressionError::Parse(_))
));
let f = Expression::new("sqrt(x)", "f").unwrap();
assert!(f.evaluate_at(&[-1.0]).is_nan());
```

## Fitting

```rust
use plot_expr::fitting::fit_linear;

let fit = fit_linear(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
assert!((fit.expression.evaluate_at(&[3.0]) - 7.0).abs() < 1e-9);
assert!(fit.mse.unwrap() < 1e-12);
```

## Features

- `libm` (default): use the `libm` crate for the function library instead of
  the platform math functions.
"#]

pub mod domain;
pub mod error;
pub mod eval;
pub mod expression;
pub mod fitting;
pub mod functions;
pub mod grammar;
pub mod interval;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod table;
pub mod types;
pub mod visitor;

pub use error::{ExpressionError, FitError, LexError, ParseError};
pub use expression::{Expression, PartialFunction};
pub use functions::Function;
pub use interval::Interval;
pub use types::{Token, TokenKind};

/// Floating-point type used for all values.
pub type Real = f64;

pub mod constants {
    use super::Real;

    pub const PI: Real = core::f64::consts::PI;
    pub const E: Real = core::f64::consts::E;
    pub const TEST_PRECISION: Real = 1e-10;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. Supports optional format arguments like assert_eq!.
///
/// Two NaNs compare equal, as do two infinities of the same sign.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let (left_val, right_val, eps) = ($left, $right, $epsilon);
        $crate::assert_approx_eq!(
            left_val,
            right_val,
            eps,
            "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
            left_val,
            right_val,
            eps
        )
    }};
    ($left:expr, $right:expr, $epsilon:expr, $($arg:tt)+) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;
        let same_nan = left_val.is_nan() && right_val.is_nan();
        let same_infinity = left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum();
        if !same_nan && !same_infinity {
            assert!((left_val - right_val).abs() < eps, $($arg)+);
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_special_values() {
        assert_approx_eq!(f64::NAN, f64::NAN);
        assert_approx_eq!(f64::INFINITY, f64::INFINITY);
        assert_approx_eq!(1.0, 1.0 + 1e-12);
        assert_approx_eq!(1.0, 1.05, 0.1, "custom message {}", 1);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_detects_difference() {
        assert_approx_eq!(1.0, 1.1);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_opposite_infinities() {
        assert_approx_eq!(f64::INFINITY, f64::NEG_INFINITY);
    }
}
