//! Parsed, evaluable piecewise expressions.
//!
//! An [`Expression`] is built once from a formula string and can then be
//! evaluated at any number of points. Parsing uses a throwaway arena for the
//! tree; only the flattened token sequences and computed intervals are kept.

use core::fmt;
use core::str::FromStr;

use bumpalo::Bump;
use log::debug;

use crate::Real;
use crate::domain::build_domain;
use crate::error::{ExpressionError, Result};
use crate::eval::evaluate_tokens;
use crate::interval::Interval;
use crate::parser;
use crate::types::{Token, TokenKind};
use crate::visitor::flatten;

/// Display name used when none is given.
pub const DEFAULT_NAME: &str = "f";

/// Variable placeholder printed for expressions without variables.
const PLACEHOLDER_VARIABLE: &str = "x";

const LETTERS: usize = 26;

/// One piece of a piecewise expression: a function and the tokens of the
/// domain it is valid on.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialFunction {
    /// Function body in post-order.
    pub function: Vec<Token>,
    /// Domain tokens in post-order, empty for an unconstrained piece.
    pub domain_tokens: Vec<Token>,
}

/// Whether every value lies in the interval of its variable.
fn contains(domain: &[Interval], values: &[Real]) -> bool {
    domain
        .iter()
        .zip(values)
        .all(|(interval, value)| interval.contains(*value))
}

/// How often a letter occurs and which position it takes in value vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableInfo {
    pub occurrences: usize,
    /// 1-based position, `None` when the letter does not occur.
    pub ordinal: Option<usize>,
}

/// A parsed piecewise expression.
///
/// ```
/// use plot_expr::Expression;
///
/// let f = Expression::new("x : (0,10) ; -x", "f").unwrap();
/// assert_eq!(f.evaluate_at(&[5.0]), 5.0);
/// assert_eq!(f.evaluate_at(&[-5.0]), 5.0);
/// assert_eq!(f.to_display_string(), "f(x)=x:(0,10);-x");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    name: String,
    source: String,
    variables: [VariableInfo; LETTERS],
    number_of_variables: usize,
    pieces: Vec<PartialFunction>,
    /// One interval per variable for each piece, parallel to `pieces`.
    domain: Vec<Vec<Interval>>,
}

fn letter_index(letter: char) -> Option<usize> {
    letter
        .is_ascii_lowercase()
        .then(|| (letter as u8 - b'a') as usize)
}

fn letter_at(index: usize) -> char {
    (b'a' + index as u8) as char
}

impl Expression {
    /// Parses `source` into an expression named `name`.
    ///
    /// The source is lower-cased before parsing. An empty `name` keeps the
    /// default `f`.
    pub fn new(source: &str, name: &str) -> Result<Self> {
        if let Some((position, character)) = source
            .char_indices()
            .find(|(_, c)| !c.is_ascii() || *c == '\0')
        {
            return Err(ExpressionError::Validation {
                position,
                character,
            });
        }

        let lowered = source.to_ascii_lowercase();
        let canonical: String = lowered
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let arena = Bump::new();
        let root = parser::parse(&lowered, &arena)?;
        let flattened = flatten(root);

        let mut variables = [VariableInfo::default(); LETTERS];
        for token in flattened.iter().flat_map(|p| p.function.iter()) {
            if let TokenKind::Variable(letter) = token.kind {
                if let Some(i) = letter_index(letter) {
                    variables[i].occurrences += 1;
                }
            }
        }
        let mut number_of_variables = 0;
        for info in variables.iter_mut().filter(|info| info.occurrences > 0) {
            number_of_variables += 1;
            info.ordinal = Some(number_of_variables);
        }

        let domain: Vec<Vec<Interval>> = flattened
            .iter()
            .map(|p| build_domain(&p.domain, number_of_variables))
            .collect();
        let pieces: Vec<PartialFunction> = flattened
            .into_iter()
            .map(|p| PartialFunction {
                function: p.function,
                domain_tokens: p.domain,
            })
            .collect();

        debug!(
            "parsed '{}' into {} pieces over {} variables",
            canonical,
            pieces.len(),
            number_of_variables
        );

        let mut expression = Expression {
            name: DEFAULT_NAME.to_string(),
            source: canonical,
            variables,
            number_of_variables,
            pieces,
            domain,
        };
        expression.set_name(name);
        Ok(expression)
    }

    /// Evaluates the expression at `values`, one value per variable in
    /// ordinal order.
    ///
    /// The first piece whose domain contains the point is used. Returns NaN
    /// when fewer values than variables are given, when no piece matches, or
    /// when the matching piece is undefined at the point.
    pub fn evaluate_at(&self, values: &[Real]) -> Real {
        if values.len() < self.number_of_variables {
            return Real::NAN;
        }
        self.pieces
            .iter()
            .zip(&self.domain)
            .find(|(_, domain)| contains(domain, values))
            .map_or(Real::NAN, |(piece, _)| {
                evaluate_tokens(&piece.function, |c| self.ordinal(c), values)
            })
    }

    pub fn number_of_variables(&self) -> usize {
        self.number_of_variables
    }

    /// 1-based position of `letter` in value vectors.
    pub fn ordinal(&self, letter: char) -> Option<usize> {
        letter_index(letter).and_then(|i| self.variables[i].ordinal)
    }

    /// How often `letter` occurs across all piece bodies.
    pub fn variable_occurrences(&self, letter: char) -> usize {
        letter_index(letter).map_or(0, |i| self.variables[i].occurrences)
    }

    /// Name of the variable at 0-based `index`, or an empty string.
    pub fn variable_name(&self, index: usize) -> String {
        self.variables
            .iter()
            .position(|info| info.ordinal == Some(index + 1))
            .map(|i| letter_at(i).to_string())
            .unwrap_or_default()
    }

    /// Intervals of every piece, in piece order.
    pub fn domain(&self) -> &[Vec<Interval>] {
        &self.domain
    }

    pub fn pieces(&self) -> &[PartialFunction] {
        &self.pieces
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the expression. Empty names are ignored.
    pub fn set_name(&mut self, name: &str) {
        if !name.is_empty() {
            self.name = name.to_string();
        }
    }

    /// The canonical source: lower-cased with whitespace removed.
    pub fn expression_string(&self) -> &str {
        &self.source
    }

    /// `name(v1,...,vN)=source`, with `x` standing in when there are no
    /// variables.
    pub fn to_display_string(&self) -> String {
        let mut variables: Vec<String> = (0..self.number_of_variables)
            .map(|i| self.variable_name(i))
            .collect();
        if variables.is_empty() {
            variables.push(PLACEHOLDER_VARIABLE.to_string());
        }
        format!("{}({})={}", self.name, variables.join(","), self.source)
    }
}

impl Default for Expression {
    /// An expression with no pieces; it evaluates to NaN everywhere.
    fn default() -> Self {
        Expression {
            name: DEFAULT_NAME.to_string(),
            source: String::new(),
            variables: [VariableInfo::default(); LETTERS],
            number_of_variables: 0,
            pieces: Vec::new(),
            domain: Vec::new(),
        }
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self> {
        Expression::new(s, DEFAULT_NAME)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_piece_selection() {
        let e = Expression::new("x : (0,10) ; -x", "f").unwrap();
        assert_approx_eq!(e.evaluate_at(&[5.0]), 5.0);
        assert_approx_eq!(e.evaluate_at(&[-5.0]), 5.0);
        // boundaries of an open interval fall through to the next piece
        assert_approx_eq!(e.evaluate_at(&[0.0]), 0.0);
        assert_approx_eq!(e.evaluate_at(&[10.0]), -10.0);
    }

    #[test]
    fn test_no_matching_piece_is_nan() {
        let e = Expression::new("x:[0,1];2*x:(1,2]", "").unwrap();
        assert_approx_eq!(e.evaluate_at(&[1.0]), 1.0);
        assert_approx_eq!(e.evaluate_at(&[1.5]), 3.0);
        assert!(e.evaluate_at(&[3.0]).is_nan());
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let e = Expression::new("1:[0,2];2:[1,3]", "g").unwrap();
        assert_eq!(e.number_of_variables(), 0);
        assert_approx_eq!(e.evaluate_at(&[]), 1.0);
    }

    #[test]
    fn test_ordinals_are_alphabetical() {
        let e = Expression::new("z - a*a", "h").unwrap();
        assert_eq!(e.number_of_variables(), 2);
        assert_eq!(e.ordinal('a'), Some(1));
        assert_eq!(e.ordinal('z'), Some(2));
        assert_eq!(e.ordinal('q'), None);
        assert_eq!(e.variable_occurrences('a'), 2);
        assert_eq!(e.variable_name(0), "a");
        assert_eq!(e.variable_name(1), "z");
        assert_eq!(e.variable_name(2), "");
        assert_approx_eq!(e.evaluate_at(&[2.0, 10.0]), 6.0);
    }

    #[test]
    fn test_too_few_values_is_nan() {
        let e = Expression::new("x+y", "f").unwrap();
        assert!(e.evaluate_at(&[1.0]).is_nan());
        assert_approx_eq!(e.evaluate_at(&[1.0, 2.0, 99.0]), 3.0);
    }

    #[test]
    fn test_canonical_source_and_display() {
        let mut e = Expression::new(" SIN( X ) * 2 ", "").unwrap();
        assert_eq!(e.name(), "f");
        assert_eq!(e.expression_string(), "sin(x)*2");
        assert_eq!(e.to_display_string(), "f(x)=sin(x)*2");
        e.set_name("");
        assert_eq!(e.name(), "f");
        e.set_name("g");
        assert_eq!(e.to_string(), "g(x)=sin(x)*2");

        let c = Expression::new("42", "c").unwrap();
        assert_eq!(c.to_display_string(), "c(x)=42");

        let two = Expression::new("y*x", "p").unwrap();
        assert_eq!(two.to_display_string(), "p(x,y)=y*x");
    }

    #[test]
    fn test_validation_rejects_non_ascii_and_nul() {
        assert_eq!(
            Expression::new("x+\u{e9}", "f").unwrap_err(),
            ExpressionError::Validation {
                position: 2,
                character: '\u{e9}',
            }
        );
        assert!(matches!(
            Expression::new("x\0", "f"),
            Err(ExpressionError::Validation { position: 1, .. })
        ));
    }

    #[test]
    fn test_empty_source() {
        let e = Expression::new("", "f").unwrap();
        assert_eq!(e.number_of_variables(), 0);
        assert_eq!(e.pieces().len(), 1);
        assert_eq!(e.domain(), &[vec![Interval::unbounded()]][..]);
        assert!(e.evaluate_at(&[]).is_nan());
        assert!(e.evaluate_at(&[1.0]).is_nan());
    }

    #[test]
    fn test_default_and_from_str() {
        let d = Expression::default();
        assert_eq!(d.name(), DEFAULT_NAME);
        assert!(d.pieces().is_empty());
        assert!(d.evaluate_at(&[1.0]).is_nan());

        let e: Expression = "x^2".parse().unwrap();
        assert_approx_eq!(e.evaluate_at(&[3.0]), 9.0);
        assert!("x^".parse::<Expression>().is_err());
    }

    #[test]
    fn test_domain_per_piece() {
        let e = Expression::new("x*y:(0,1)|[2,3];x+y", "f").unwrap();
        let domain = e.domain();
        assert_eq!(domain.len(), 2);
        assert_eq!(domain[0], vec![Interval::open(0.0, 1.0), Interval::closed(2.0, 3.0)]);
        assert!(domain[1].iter().all(Interval::is_unbounded));
        assert_approx_eq!(e.evaluate_at(&[0.5, 2.0]), 1.0);
        assert_approx_eq!(e.evaluate_at(&[0.5, 4.0]), 4.5);
    }

    #[test]
    fn test_domain_borrows_stored_intervals() {
        let e = Expression::new("x:[0,1];x:(1,2];x", "f").unwrap();
        let domain: &[Vec<Interval>] = e.domain();
        assert_eq!(domain.len(), e.pieces().len());
        assert!(domain.iter().all(|intervals| intervals.len() == 1));
        assert_eq!(domain[1], vec![Interval::new(1.0, 2.0, true, false)]);
        // repeated calls hand out the same storage
        assert!(core::ptr::eq(e.domain(), domain));
        assert!(Expression::default().domain().is_empty());
    }

    #[test]
    fn test_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Expression>();
    }
}
