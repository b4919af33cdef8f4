//! Band constraint on the warping window.

use std::ops::Range;

/// Constraint on the DTW warping window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// Every cell of the cost matrix is reachable.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: cell (i,j) is valid only if |i - j| <= radius.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Return the valid column range for `row` in a cost matrix with `n_cols` columns.
    #[must_use]
    pub fn column_range(&self, row: usize, n_cols: usize) -> Range<usize> {
        match self {
            Self::Unconstrained => 0..n_cols,
            Self::SakoeChibaRadius(r) => {
                let start = row.saturating_sub(*r);
                let end = (row + r + 1).min(n_cols);
                start..end
            }
        }
    }

    /// Return true if the end cell `(n-1, m-1)` is inside the band.
    #[must_use]
    pub fn reaches_end(&self, n: usize, m: usize) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::SakoeChibaRadius(r) => n.abs_diff(m) <= *r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_full_range() {
        let c = BandConstraint::Unconstrained;
        assert_eq!(c.column_range(0, 10), 0..10);
        assert_eq!(c.column_range(9, 10), 0..10);
    }

    #[test]
    fn sakoe_chiba_clips_at_edges() {
        let c = BandConstraint::SakoeChibaRadius(2);
        assert_eq!(c.column_range(0, 10), 0..3);
        assert_eq!(c.column_range(5, 10), 3..8);
        assert_eq!(c.column_range(9, 10), 7..10);
    }

    #[test]
    fn radius_larger_than_series() {
        let c = BandConstraint::SakoeChibaRadius(20);
        assert_eq!(c.column_range(3, 5), 0..5);
    }

    #[test]
    fn end_reachability() {
        assert!(BandConstraint::SakoeChibaRadius(1).reaches_end(5, 6));
        assert!(!BandConstraint::SakoeChibaRadius(1).reaches_end(5, 7));
        assert!(BandConstraint::Unconstrained.reaches_end(1, 100));
    }
}
