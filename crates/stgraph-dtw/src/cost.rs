//! Per-cell cost between two aligned samples.

/// Local cost function applied to every aligned pair of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalCost {
    /// `|a - b|`, accumulated as a plain sum.
    #[default]
    Absolute,

    /// `(a - b)^2`, accumulated and reported as the square root of the sum.
    Squared,
}

impl LocalCost {
    #[inline]
    pub(crate) fn between(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Absolute => (a - b).abs(),
            Self::Squared => (a - b).powi(2),
        }
    }

    /// Map the accumulated cost at the end cell to the reported distance.
    #[inline]
    pub(crate) fn finish(self, accumulated: f64) -> f64 {
        match self {
            Self::Absolute => accumulated,
            Self::Squared => accumulated.sqrt(),
        }
    }
}
