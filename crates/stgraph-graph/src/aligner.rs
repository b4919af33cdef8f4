//! Alignment capability used for the semantic graph.

use stgraph_dtw::{Dtw, DtwError, LocalCost};

/// Returns an alignment cost between two sequences under a bounded search radius.
///
/// Implementations are called concurrently from the pairwise computation and
/// must be pure: the same inputs always give the same cost.
pub trait Aligner: Sync {
    /// Alignment cost between `a` and `b`, searching at most `radius` steps off the diagonal.
    ///
    /// # Errors
    ///
    /// Returns a [`DtwError`] when the sequences cannot be aligned.
    fn align(&self, a: &[f64], b: &[f64], radius: usize) -> Result<f64, DtwError>;
}

impl<T: Aligner + ?Sized> Aligner for &T {
    fn align(&self, a: &[f64], b: &[f64], radius: usize) -> Result<f64, DtwError> {
        (**self).align(a, b, radius)
    }
}

/// Sakoe-Chiba banded DTW. Absolute-difference local cost by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandedDtw {
    cost: LocalCost,
}

impl BandedDtw {
    /// Create a banded aligner with absolute local cost.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the local cost function.
    #[must_use]
    pub fn with_local_cost(mut self, cost: LocalCost) -> Self {
        self.cost = cost;
        self
    }
}

impl Aligner for BandedDtw {
    fn align(&self, a: &[f64], b: &[f64], radius: usize) -> Result<f64, DtwError> {
        Dtw::with_sakoe_chiba(radius)
            .with_local_cost(self.cost)
            .align(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banded_dtw_matches_direct_call() {
        let a = [0.0, 5.0, 0.0, 0.0, 0.0];
        let b = [0.0, 0.0, 0.0, 5.0, 0.0];
        assert_eq!(BandedDtw::new().align(&a, &b, 2).unwrap(), 0.0);
        assert_eq!(BandedDtw::new().align(&a, &b, 1).unwrap(), 10.0);
    }

    #[test]
    fn reference_forwarding() {
        let aligner = BandedDtw::new();
        let by_ref: &dyn Aligner = &aligner;
        assert_eq!(by_ref.align(&[1.0], &[4.0], 6).unwrap(), 3.0);
    }
}
