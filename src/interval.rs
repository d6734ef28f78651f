use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Real;

/// A real interval with independently open or closed ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    low: Real,
    high: Real,
    low_open: bool,
    high_open: bool,
}

impl Interval {
    /// Creates an interval. Reversed bounds are swapped together with their
    /// open flags, so `low <= high` always holds for non-NaN bounds.
    pub fn new(low: Real, high: Real, low_open: bool, high_open: bool) -> Self {
        if low > high {
            Interval {
                low: high,
                high: low,
                low_open: high_open,
                high_open: low_open,
            }
        } else {
            Interval {
                low,
                high,
                low_open,
                high_open,
            }
        }
    }

    /// `(-inf, inf)`, the domain of an unconstrained variable.
    pub fn unbounded() -> Self {
        Interval::new(Real::NEG_INFINITY, Real::INFINITY, true, true)
    }

    pub fn closed(low: Real, high: Real) -> Self {
        Interval::new(low, high, false, false)
    }

    pub fn open(low: Real, high: Real) -> Self {
        Interval::new(low, high, true, true)
    }

    pub fn low(&self) -> Real {
        self.low
    }

    pub fn high(&self) -> Real {
        self.high
    }

    pub fn is_low_open(&self) -> bool {
        self.low_open
    }

    pub fn is_high_open(&self) -> bool {
        self.high_open
    }

    pub fn is_unbounded(&self) -> bool {
        self.low == Real::NEG_INFINITY && self.high == Real::INFINITY
    }

    /// Whether `value` lies in the interval. NaN is never contained.
    pub fn contains(&self, value: Real) -> bool {
        let above_low = if self.low_open {
            value > self.low
        } else {
            value >= self.low
        };
        let below_high = if self.high_open {
            value < self.high
        } else {
            value <= self.high
        };
        above_low && below_high
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::unbounded()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.low_open { '(' } else { '[' },
            self.low,
            self.high,
            if self.high_open { ')' } else { ']' }
        )
    }
}
