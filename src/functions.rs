//! Built-in function library.
//!
//! Formulas may call a fixed set of one-argument functions. Each is a plain
//! `Real -> Real` mapping that follows IEEE semantics: out-of-domain inputs
//! produce NaN or an infinity, never an error.
//!
//! With the default `libm` feature the primitives come from the `libm` crate
//! so results do not depend on the platform's C math library. Without it the
//! inherent `f64` methods are used.

use serde::{Deserialize, Serialize};

use crate::Real;

#[cfg(feature = "libm")]
mod math {
    pub use libm::{
        acos as libm_acos, asin as libm_asin, atan as libm_atan, ceil as libm_ceil,
        cos as libm_cos, cosh as libm_cosh, exp as libm_exp, fabs as libm_abs,
        floor as libm_floor, log as libm_ln, log10 as libm_log10, pow as libm_pow,
        sin as libm_sin, sinh as libm_sinh, sqrt as libm_sqrt, tan as libm_tan,
        tanh as libm_tanh, trunc as libm_trunc,
    };
}

#[cfg(not(feature = "libm"))]
mod math {
    use crate::Real;

    pub fn libm_acos(x: Real) -> Real {
        x.acos()
    }

    pub fn libm_asin(x: Real) -> Real {
        x.asin()
    }

    pub fn libm_atan(x: Real) -> Real {
        x.atan()
    }

    pub fn libm_ceil(x: Real) -> Real {
        x.ceil()
    }

    pub fn libm_cos(x: Real) -> Real {
        x.cos()
    }

    pub fn libm_cosh(x: Real) -> Real {
        x.cosh()
    }

    pub fn libm_exp(x: Real) -> Real {
        x.exp()
    }

    pub fn libm_abs(x: Real) -> Real {
        x.abs()
    }

    pub fn libm_floor(x: Real) -> Real {
        x.floor()
    }

    pub fn libm_ln(x: Real) -> Real {
        x.ln()
    }

    pub fn libm_log10(x: Real) -> Real {
        x.log10()
    }

    pub fn libm_pow(x: Real, y: Real) -> Real {
        x.powf(y)
    }

    pub fn libm_sin(x: Real) -> Real {
        x.sin()
    }

    pub fn libm_sinh(x: Real) -> Real {
        x.sinh()
    }

    pub fn libm_sqrt(x: Real) -> Real {
        x.sqrt()
    }

    pub fn libm_tan(x: Real) -> Real {
        x.tan()
    }

    pub fn libm_tanh(x: Real) -> Real {
        x.tanh()
    }

    pub fn libm_trunc(x: Real) -> Real {
        x.trunc()
    }
}

use math::*;

/// Largest argument for which `fac` is computed; anything above overflows
/// `f64` and yields positive infinity.
pub const MAX_FACTORIAL_ARGUMENT: Real = 171.0;

/// A function name recognised by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Abs,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    /// Natural logarithm.
    Ln,
    /// Base-10 logarithm.
    Log,
    Exp,
    /// Factorial, extended to non-integers by the descending product.
    Fac,
    /// Truncation towards zero.
    Int,
    Floor,
    Ceil,
    /// Round half up.
    Rnd,
    /// Sign: -1, 0 or 1.
    Sgn,
    /// Step function: 1 for non-negative arguments, 0 otherwise.
    Sgx,
}

/// Every function with its source spelling, in lookup order.
pub static FUNCTIONS: &[(&str, Function)] = &[
    ("abs", Function::Abs),
    ("sqrt", Function::Sqrt),
    ("sin", Function::Sin),
    ("cos", Function::Cos),
    ("tan", Function::Tan),
    ("arcsin", Function::Arcsin),
    ("arccos", Function::Arccos),
    ("arctan", Function::Arctan),
    ("sinh", Function::Sinh),
    ("cosh", Function::Cosh),
    ("tanh", Function::Tanh),
    ("ln", Function::Ln),
    ("log", Function::Log),
    ("exp", Function::Exp),
    ("fac", Function::Fac),
    ("int", Function::Int),
    ("floor", Function::Floor),
    ("ceil", Function::Ceil),
    ("rnd", Function::Rnd),
    ("sgn", Function::Sgn),
    ("sgx", Function::Sgx),
];

impl Function {
    /// Looks up a lowercase identifier in the function table.
    pub fn from_name(name: &str) -> Option<Function> {
        FUNCTIONS
            .iter()
            .find(|(spelling, _)| *spelling == name)
            .map(|(_, function)| *function)
    }

    pub fn name(self) -> &'static str {
        FUNCTIONS
            .iter()
            .find(|(_, function)| *function == self)
            .map(|(spelling, _)| *spelling)
            .unwrap_or("?")
    }

    /// Evaluates the function at `x`.
    pub fn apply(self, x: Real) -> Real {
        match self {
            Function::Abs => libm_abs(x),
            Function::Sqrt => libm_sqrt(x),
            Function::Sin => libm_sin(x),
            Function::Cos => libm_cos(x),
            Function::Tan => libm_tan(x),
            Function::Arcsin => libm_asin(x),
            Function::Arccos => libm_acos(x),
            Function::Arctan => libm_atan(x),
            Function::Sinh => libm_sinh(x),
            Function::Cosh => libm_cosh(x),
            Function::Tanh => libm_tanh(x),
            Function::Ln => libm_ln(x),
            Function::Log => libm_log10(x),
            Function::Exp => libm_exp(x),
            Function::Fac => factorial(x),
            Function::Int => libm_trunc(x),
            Function::Floor => libm_floor(x),
            Function::Ceil => libm_ceil(x),
            Function::Rnd => libm_floor(x + 0.5),
            Function::Sgn => sign(x),
            Function::Sgx => step(x),
        }
    }
}

/// Raises `base` to `exponent`.
pub fn pow(base: Real, exponent: Real) -> Real {
    libm_pow(base, exponent)
}

/// Descending product `x * (x-1) * ...` while the next factor stays positive.
///
/// `fac(0)` is 1, negative or NaN arguments give NaN and arguments above
/// [`MAX_FACTORIAL_ARGUMENT`] give positive infinity.
pub fn factorial(x: Real) -> Real {
    if x.is_nan() || x < 0.0 {
        return Real::NAN;
    }
    if x == 0.0 {
        return 1.0;
    }
    if x > MAX_FACTORIAL_ARGUMENT {
        return Real::INFINITY;
    }
    let mut factor = x;
    let mut result = x;
    while factor - 1.0 > 0.0 {
        factor -= 1.0;
        result *= factor;
    }
    result
}

pub fn sign(x: Real) -> Real {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        // 0 and NaN map to themselves
        x
    }
}

pub fn step(x: Real) -> Real {
    if x >= 0.0 { 1.0 } else { 0.0 }
}
