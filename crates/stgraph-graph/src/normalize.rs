//! Renormalized graph-convolution propagation operator.

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::GraphError;

/// Propagation scale; the operator is `ALPHA / 2 * (I + D^-1/2 A D^-1/2)`.
pub const ALPHA: f64 = 0.8;

/// Lower bound applied to node degrees before inversion.
pub const DEGREE_FLOOR: f64 = 1e-5;

/// Degree-normalize `adjacency` and add the self-loop term.
///
/// Degrees are row sums clamped up to [`DEGREE_FLOOR`], so an isolated node
/// keeps only its self-loop mass `ALPHA / 2`. The output is symmetric when
/// `adjacency` is.
///
/// # Errors
///
/// Returns [`GraphError::NotSquare`] if `adjacency` is not square.
pub fn normalize_adjacency(adjacency: ArrayView2<'_, f64>) -> Result<Array2<f64>, GraphError> {
    let (rows, cols) = adjacency.dim();
    if rows != cols {
        return Err(GraphError::NotSquare { rows, cols });
    }

    let inv_sqrt = adjacency
        .sum_axis(Axis(1))
        .mapv(|degree| 1.0 / degree.max(DEGREE_FLOOR).sqrt());

    let mut propagation =
        Array2::from_shape_fn((rows, cols), |(i, j)| inv_sqrt[i] * adjacency[[i, j]] * inv_sqrt[j]);
    let mut diagonal = propagation.diag_mut();
    diagonal += 1.0;
    propagation *= ALPHA / 2.0;
    Ok(propagation)
}
