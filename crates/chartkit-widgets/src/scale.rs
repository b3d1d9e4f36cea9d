//! Value ranges and linear value-to-pixel mapping.

use serde::{Deserialize, Serialize};

/// A closed value interval with non-zero span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl ValueRange {
    /// Create a range. Swapped bounds are reordered, non-finite bounds become
    /// `[0, 1]` and a zero-width range around `v` widens to `[v-1, v+1]`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        if !min.is_finite() || !max.is_finite() {
            return Self { min: 0.0, max: 1.0 };
        }
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if max - min <= f64::EPSILON * max.abs().max(1.0) {
            Self {
                min: min - 1.0,
                max: max + 1.0,
            }
        } else {
            Self { min, max }
        }
    }

    /// Range over the finite values, `None` when there are none.
    #[must_use]
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        (min <= max).then(|| Self::new(min, max))
    }

    /// Extend the range so it contains zero.
    #[must_use]
    pub fn including_zero(self) -> Self {
        Self::new(self.min.min(0.0), self.max.max(0.0))
    }

    /// Width of the range.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` in the range, `0.0` at `min` and `1.0` at `max`.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }

    /// `normalize` clamped to `[0, 1]`.
    #[must_use]
    pub fn fraction(&self, value: f64) -> f64 {
        self.normalize(value).clamp(0.0, 1.0)
    }
}

/// Maps a value range onto a pixel interval; `to` may be less than `from`
/// (y axes grow downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    range: ValueRange,
    from: f64,
    to: f64,
}

impl LinearScale {
    /// Create a scale.
    #[must_use]
    pub const fn new(range: ValueRange, from: f64, to: f64) -> Self {
        Self { range, from, to }
    }

    /// The value range.
    #[must_use]
    pub const fn range(&self) -> ValueRange {
        self.range
    }

    /// Pixel position of a value.
    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        (self.to - self.from).mul_add(self.range.normalize(value), self.from)
    }
}
