//! Standardization and Gaussian kernel helpers shared by both graphs.

use ndarray::Array1;

/// Population mean and standard deviation of a set of matrix entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Moments {
    pub(crate) mean: f64,
    pub(crate) std: f64,
}

impl Moments {
    /// Moments of `values`, or `None` when there are no values.
    pub(crate) fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Array1<f64> = values.into_iter().collect();
        let mean = values.mean()?;
        Some(Self {
            mean,
            std: values.std(0.0),
        })
    }

    /// True when the entries have a finite, non-zero spread.
    #[inline]
    pub(crate) fn has_spread(&self) -> bool {
        self.std > 0.0 && self.std.is_finite()
    }

    /// Standard score of `value`. A zero spread falls back to a unit divisor.
    #[inline]
    pub(crate) fn z(&self, value: f64) -> f64 {
        let scale = if self.has_spread() { self.std } else { 1.0 };
        (value - self.mean) / scale
    }
}

/// `exp(-z^2 / sigma^2)`. Infinite `z` maps to zero.
#[inline]
pub(crate) fn gaussian(z: f64, sigma: f64) -> f64 {
    (-(z * z) / (sigma * sigma)).exp()
}
