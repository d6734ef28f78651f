//! Curve fitting over sampled points.
//!
//! Every routine returns an ordinary [`Expression`] in the formula language,
//! so a fitted curve can be plotted, displayed and evaluated like a typed-in
//! formula. Regressions report their mean squared error over the samples;
//! splines and the interpolation polynomial pass through every sample and
//! report none.

use log::debug;

use crate::Real;
use crate::error::FitError;
use crate::expression::Expression;

/// A sample `(x, y)`.
pub type Point = (Real, Real);

/// Name given to fitted expressions.
pub const FIT_NAME: &str = "f";

/// A fitted expression and, for regressions, its mean squared error.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub expression: Expression,
    pub mse: Option<Real>,
}

/// Least-squares line `y = a + b*x` through the finite samples.
///
/// Returns `None` for fewer than two finite samples or when all of them
/// share the same x.
pub fn linear_regression(points: &[Point]) -> Option<(Real, Real)> {
    let usable: Vec<Point> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if usable.len() < 2 {
        return None;
    }
    let n = usable.len() as Real;
    let mean_x = usable.iter().map(|p| p.0).sum::<Real>() / n;
    let mean_y = usable.iter().map(|p| p.1).sum::<Real>() / n;
    let (sxx, sxy) = usable.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });
    if sxx == 0.0 {
        return None;
    }
    let b = sxy / sxx;
    Some((mean_y - b * mean_x, b))
}

/// `y = a + b*x`.
pub fn fit_linear(points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(points, |x| x, |y| y, |a, b| {
        format!("{} + {}*x", coefficient(a), coefficient(b))
    })
}

/// `y = a + b*sqrt(x)`. Samples with negative x are skipped.
pub fn fit_sqrt(points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(points, Real::sqrt, |y| y, |a, b| {
        format!("{} + {}*sqrt(x)", coefficient(a), coefficient(b))
    })
}

/// `y = a + b*x^2`.
pub fn fit_square(points: &[Point]) -> Result<Fit, FitError> {
    fit_polynomial_term(2, points)
}

/// `y = a + b*x^3`.
pub fn fit_cubic(points: &[Point]) -> Result<Fit, FitError> {
    fit_polynomial_term(3, points)
}

/// `y = a + b*x^dimension`.
pub fn fit_polynomial_term(dimension: i32, points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(
        points,
        |x| x.powi(dimension),
        |y| y,
        |a, b| {
            format!(
                "{} + {}*x^{}",
                coefficient(a),
                coefficient(b),
                coefficient(Real::from(dimension))
            )
        },
    )
}

/// `y = a + b*log(x)` with the base-10 logarithm. Samples with
/// non-positive x are skipped.
pub fn fit_logarithmic(points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(points, Real::log10, |y| y, |a, b| {
        format!("{} + {}*log(x)", coefficient(a), coefficient(b))
    })
}

/// `y = a + b*sin(x)`.
pub fn fit_sin(points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(points, Real::sin, |y| y, |a, b| {
        format!("{} + {}*sin(x)", coefficient(a), coefficient(b))
    })
}

/// `y = a + b*cos(x)`.
pub fn fit_cos(points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(points, Real::cos, |y| y, |a, b| {
        format!("{} + {}*cos(x)", coefficient(a), coefficient(b))
    })
}

/// `y = c*x^b`, fitted as a line in log-log space. Only samples with
/// positive x and y take part.
pub fn fit_power(points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(points, Real::ln, Real::ln, |a, b| {
        format!("{}*x^{}", coefficient(a.exp()), coefficient(b))
    })
}

/// `y = c*d^x`, fitted as a line through `(x, ln y)`. Only samples with
/// positive y take part.
pub fn fit_exponential(points: &[Point]) -> Result<Fit, FitError> {
    regression_fit(points, |x| x, Real::ln, |a, b| {
        format!("{}*{}^x", coefficient(a.exp()), coefficient(b.exp()))
    })
}

/// Step function holding each sample's y until the next sample.
pub fn constant_spline(points: &[Point]) -> Result<Fit, FitError> {
    let samples = sorted_samples(points, 2)?;
    let pieces: Vec<String> = samples
        .windows(2)
        .map(|w| format!("{}:{}", coefficient(w[0].1), knot_range(w[0].0, w[1].0)))
        .collect();
    spline_fit(&pieces)
}

/// Polyline through the samples.
pub fn linear_spline(points: &[Point]) -> Result<Fit, FitError> {
    let samples = sorted_samples(points, 2)?;
    let pieces: Vec<String> = samples
        .windows(2)
        .map(|w| {
            let ((x0, y0), (x1, y1)) = (w[0], w[1]);
            let slope = (y1 - y0) / (x1 - x0);
            format!(
                "{}*x + {}:{}",
                coefficient(slope),
                coefficient(y0 - slope * x0),
                knot_range(x0, x1)
            )
        })
        .collect();
    spline_fit(&pieces)
}

/// Continuously differentiable piecewise quadratic through the samples.
///
/// The first segment is the straight line to the second sample; each
/// following segment starts with the slope the previous one ended with.
pub fn quadratic_spline(points: &[Point]) -> Result<Fit, FitError> {
    let samples = sorted_samples(points, 2)?;
    let mut slope = (samples[1].1 - samples[0].1) / (samples[1].0 - samples[0].0);
    let mut pieces = Vec::with_capacity(samples.len() - 1);
    for w in samples.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        let h = x1 - x0;
        let next_slope = 2.0 * (y1 - y0) / h - slope;
        let curvature = (next_slope - slope) / (2.0 * h);
        pieces.push(format!(
            "{} + {}*{t} + {}*{t}^2:{}",
            coefficient(y0),
            coefficient(slope),
            coefficient(curvature),
            knot_range(x0, x1),
            t = shifted(x0),
        ));
        slope = next_slope;
    }
    spline_fit(&pieces)
}

/// Natural cubic spline through the samples.
pub fn cubic_spline(points: &[Point]) -> Result<Fit, FitError> {
    let samples = sorted_samples(points, 2)?;
    let n = samples.len();
    let h: Vec<Real> = samples.windows(2).map(|w| w[1].0 - w[0].0).collect();

    // second derivatives at the interior knots; zero at both ends
    let interior = n - 2;
    let mut sub = Vec::with_capacity(interior);
    let mut diag = Vec::with_capacity(interior);
    let mut sup = Vec::with_capacity(interior);
    let mut rhs = Vec::with_capacity(interior);
    for i in 1..n - 1 {
        sub.push(h[i - 1]);
        diag.push(2.0 * (h[i - 1] + h[i]));
        sup.push(h[i]);
        rhs.push(
            6.0 * ((samples[i + 1].1 - samples[i].1) / h[i]
                - (samples[i].1 - samples[i - 1].1) / h[i - 1]),
        );
    }
    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs)
        .ok_or(FitError::Degenerate("singular spline system"))?;
    let mut m = Vec::with_capacity(n);
    m.push(0.0);
    m.extend(inner);
    m.push(0.0);

    let pieces: Vec<String> = (0..n - 1)
        .map(|i| {
            let (x0, y0) = samples[i];
            let (x1, y1) = samples[i + 1];
            let b = (y1 - y0) / h[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            let c = m[i] / 2.0;
            let d = (m[i + 1] - m[i]) / (6.0 * h[i]);
            format!(
                "{} + {}*{t} + {}*{t}^2 + {}*{t}^3:{}",
                coefficient(y0),
                coefficient(b),
                coefficient(c),
                coefficient(d),
                knot_range(x0, x1),
                t = shifted(x0),
            )
        })
        .collect();
    spline_fit(&pieces)
}

/// Interpolation polynomial through all samples, in Lagrange form.
pub fn interpolation_polynomial(points: &[Point]) -> Result<Fit, FitError> {
    let samples = sorted_samples(points, 1)?;
    let terms: Vec<String> = samples
        .iter()
        .enumerate()
        .map(|(i, &(xi, yi))| {
            let denominator: Real = samples
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, &(xj, _))| xi - xj)
                .product();
            let mut term = coefficient(yi / denominator);
            for (_, &(xj, _)) in samples.iter().enumerate().filter(|(j, _)| *j != i) {
                term.push('*');
                term.push_str(&shifted(xj));
            }
            term
        })
        .collect();
    let expression = Expression::new(&terms.join(" + "), FIT_NAME)?;
    debug!("interpolation polynomial of degree {}", samples.len() - 1);
    Ok(Fit {
        expression,
        mse: None,
    })
}

/// Mean squared error of `expression` over the finite samples it is
/// defined at. NaN when there are none.
pub fn mean_squared_error(expression: &Expression, points: &[Point]) -> Real {
    let errors: Vec<Real> = points
        .iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|&(x, y)| expression.evaluate_at(&[x]) - y)
        .filter(|e| e.is_finite())
        .map(|e| e * e)
        .collect();
    if errors.is_empty() {
        return Real::NAN;
    }
    errors.iter().sum::<Real>() / errors.len() as Real
}

fn regression_fit<X, Y, F>(
    points: &[Point],
    transform_x: X,
    transform_y: Y,
    formula: F,
) -> Result<Fit, FitError>
where
    X: Fn(Real) -> Real,
    Y: Fn(Real) -> Real,
    F: Fn(Real, Real) -> String,
{
    let transformed: Vec<Point> = points
        .iter()
        .map(|&(x, y)| (transform_x(x), transform_y(y)))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if transformed.len() < 2 {
        return Err(FitError::NotEnoughPoints {
            required: 2,
            found: transformed.len(),
        });
    }
    let (a, b) = linear_regression(&transformed)
        .ok_or(FitError::Degenerate("all samples share the same abscissa"))?;
    let source = formula(a, b);
    let expression = Expression::new(&source, FIT_NAME)?;
    let mse = mean_squared_error(&expression, points);
    debug!("fitted {} with mse {}", source, mse);
    Ok(Fit {
        expression,
        mse: Some(mse),
    })
}

fn spline_fit(pieces: &[String]) -> Result<Fit, FitError> {
    let expression = Expression::new(&pieces.join(";"), FIT_NAME)?;
    debug!("spline with {} segments", pieces.len());
    Ok(Fit {
        expression,
        mse: None,
    })
}

/// Finite samples sorted by x, which must be pairwise distinct.
fn sorted_samples(points: &[Point], required: usize) -> Result<Vec<Point>, FitError> {
    let mut samples: Vec<Point> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if samples.len() < required {
        return Err(FitError::NotEnoughPoints {
            required,
            found: samples.len(),
        });
    }
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    if samples.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(FitError::Degenerate("samples share an abscissa"));
    }
    Ok(samples)
}

/// Formats a number as a formula operand, bracketing negative values.
fn coefficient(value: Real) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value < 0.0 {
        format!("({})", value)
    } else {
        format!("{}", value)
    }
}

fn shifted(origin: Real) -> String {
    format!("(x - {})", coefficient(origin))
}

fn knot_range(low: Real, high: Real) -> String {
    format!("[{},{}]", low, high)
}

/// Solves a tridiagonal system with the Thomas algorithm. `sub[0]` and
/// the last entry of `sup` are not used.
fn solve_tridiagonal(sub: &[Real], diag: &[Real], sup: &[Real], rhs: &[Real]) -> Option<Vec<Real>> {
    let n = diag.len();
    if n == 0 {
        return Some(Vec::new());
    }
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];
    if diag[0] == 0.0 {
        return None;
    }
    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denominator = diag[i] - sub[i] * c[i - 1];
        if denominator == 0.0 {
            return None;
        }
        c[i] = sup[i] / denominator;
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / denominator;
    }
    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    const EPS: Real = 1e-9;

    fn sample(f: impl Fn(Real) -> Real, xs: &[Real]) -> Vec<Point> {
        xs.iter().map(|&x| (x, f(x))).collect()
    }

    #[test]
    fn test_linear_regression_exact_line() {
        let points = sample(|x| 1.0 - 2.0 * x, &[0.0, 1.0, 2.0, 3.0]);
        let (a, b) = linear_regression(&points).unwrap();
        assert_approx_eq!(a, 1.0, EPS);
        assert_approx_eq!(b, -2.0, EPS);
    }

    #[test]
    fn test_linear_regression_ignores_nan_samples() {
        let mut points = sample(|x| 3.0 * x, &[1.0, 2.0]);
        points.push((Real::NAN, 7.0));
        let (a, b) = linear_regression(&points).unwrap();
        assert_approx_eq!(a, 0.0, EPS);
        assert_approx_eq!(b, 3.0, EPS);
        assert_eq!(linear_regression(&[(1.0, 1.0), (1.0, 2.0)]), None);
        assert_eq!(linear_regression(&[(1.0, 1.0)]), None);
    }

    #[test]
    fn test_tridiagonal_solver() {
        // [2 1 0; 1 2 1; 0 1 2] x = [4 8 8] has solution [1 2 3]
        let x = solve_tridiagonal(&[0.0, 1.0, 1.0], &[2.0; 3], &[1.0, 1.0, 0.0], &[4.0, 8.0, 8.0])
            .unwrap();
        assert_approx_eq!(x[0], 1.0, EPS);
        assert_approx_eq!(x[1], 2.0, EPS);
        assert_approx_eq!(x[2], 3.0, EPS);
        assert_eq!(solve_tridiagonal(&[0.0], &[0.0], &[0.0], &[1.0]), None);
    }

    #[test]
    fn test_coefficient_formatting() {
        assert_eq!(coefficient(2.5), "2.5");
        assert_eq!(coefficient(-2.5), "(-2.5)");
        assert_eq!(coefficient(-0.0), "0");
        assert_eq!(shifted(-1.0), "(x - (-1))");
    }

    #[test]
    fn test_sorted_samples_rejects_duplicates() {
        assert_eq!(
            sorted_samples(&[(1.0, 1.0), (1.0, 2.0)], 2),
            Err(FitError::Degenerate("samples share an abscissa"))
        );
        let sorted = sorted_samples(&[(2.0, 0.0), (-1.0, 0.0), (0.5, 0.0)], 2).unwrap();
        assert_eq!(sorted.iter().map(|p| p.0).collect::<Vec<_>>(), vec![-1.0, 0.5, 2.0]);
    }
}
