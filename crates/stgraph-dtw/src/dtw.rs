//! DTW alignment cost.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::cost::LocalCost;
use crate::error::DtwError;
use crate::series::SeriesView;

/// Immutable DTW configuration. Thread-safe and copyable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw {
    constraint: BandConstraint,
    cost: LocalCost,
}

impl Dtw {
    /// Create an unconstrained DTW calculator with absolute local cost.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Create a DTW calculator restricted to a Sakoe-Chiba band of `radius`.
    #[must_use]
    pub fn with_sakoe_chiba(radius: usize) -> Self {
        Self {
            constraint: BandConstraint::SakoeChibaRadius(radius),
            cost: LocalCost::default(),
        }
    }

    /// Set the local cost function.
    #[must_use]
    pub fn with_local_cost(mut self, cost: LocalCost) -> Self {
        self.cost = cost;
        self
    }

    /// Return the band constraint configuration.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Return the local cost function.
    #[must_use]
    pub fn local_cost(&self) -> LocalCost {
        self.cost
    }

    /// Compute the alignment cost between two validated sequences.
    ///
    /// Runs in O(n * m) time unconstrained, O(n * r) inside a band of radius
    /// `r`, and O(m) space using two rolling rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::BandTooNarrow`] | The band excludes the end cell `(n-1, m-1)` |
    #[instrument(level = "trace", skip(a, b), fields(len_a = a.len(), len_b = b.len()))]
    pub fn distance(&self, a: SeriesView<'_>, b: SeriesView<'_>) -> Result<f64, DtwError> {
        let (n, m) = (a.len(), b.len());
        if let BandConstraint::SakoeChibaRadius(radius) = self.constraint
            && !self.constraint.reaches_end(n, m)
        {
            return Err(DtwError::BandTooNarrow {
                radius,
                len_a: n,
                len_b: m,
            });
        }
        let accumulated = self.accumulate(a.as_slice(), b.as_slice());
        Ok(self.cost.finish(accumulated))
    }

    /// Validate two raw slices and compute their alignment cost.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::EmptySeries`] or [`DtwError::NonFiniteValue`] for
    /// invalid input, or [`DtwError::BandTooNarrow`] as for [`Dtw::distance`].
    pub fn align(&self, a: &[f64], b: &[f64]) -> Result<f64, DtwError> {
        self.distance(SeriesView::new(a)?, SeriesView::new(b)?)
    }

    /// Rolling two-row accumulation.
    ///
    /// Each row buffer has `m + 1` slots: slot `j + 1` holds `C[i][j]` and
    /// slot 0 is the virtual column left of the matrix. The initial row
    /// carries `C[-1][-1] = 0` so that `C[0][0]` equals its local cost.
    /// Cells outside the band stay at infinity.
    fn accumulate(&self, a: &[f64], b: &[f64]) -> f64 {
        let m = b.len();
        let mut prev = vec![f64::INFINITY; m + 1];
        let mut curr = vec![f64::INFINITY; m + 1];
        prev[0] = 0.0;

        for (i, &x) in a.iter().enumerate() {
            curr.fill(f64::INFINITY);
            for j in self.constraint.column_range(i, m) {
                // diagonal, above, left
                let best = prev[j].min(prev[j + 1]).min(curr[j]);
                curr[j + 1] = self.cost.between(x, b[j]) + best;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap `prev` holds the last completed row.
        prev[m]
    }
}
