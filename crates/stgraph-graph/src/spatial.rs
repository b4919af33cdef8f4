//! Spatial graph: Gaussian kernel over physical sensor distances.

use ndarray::Array2;
use tracing::warn;

use crate::dataset::Edge;
use crate::error::GraphError;
use crate::kernel::{Moments, gaussian};

/// Dense distance matrix from an undirected edge list. Missing edges are `+inf`.
pub(crate) fn distance_matrix(n_nodes: usize, edges: &[Edge]) -> Result<Array2<f64>, GraphError> {
    let mut matrix = Array2::from_elem((n_nodes, n_nodes), f64::INFINITY);
    for (position, edge) in edges.iter().enumerate() {
        let Edge { from, to, distance } = *edge;
        if from >= n_nodes || to >= n_nodes {
            return Err(GraphError::EdgeOutOfRange {
                position,
                from,
                to,
                n_nodes,
            });
        }
        if !distance.is_finite() {
            return Err(GraphError::NonFiniteDistance {
                position,
                from,
                to,
                distance,
            });
        }
        matrix[[from, to]] = distance;
        matrix[[to, from]] = distance;
    }
    Ok(matrix)
}

/// Standardize over finite entries, apply the Gaussian kernel, and drop weak links.
///
/// Infinite distances are excluded from the statistics and map to a zero
/// kernel response. Responses below `thresh` are zeroed; the rest keep their
/// continuous weight.
pub(crate) fn spatial_adjacency(distances: &Array2<f64>, sigma: f64, thresh: f64) -> Array2<f64> {
    let finite = distances.iter().copied().filter(|d| d.is_finite());
    let Some(moments) = Moments::of(finite) else {
        warn!(n_nodes = distances.nrows(), "no finite distances, spatial graph is empty");
        return Array2::zeros(distances.raw_dim());
    };
    distances.mapv(|d| {
        let weight = gaussian(moments.z(d), sigma);
        if weight < thresh { 0.0 } else { weight }
    })
}
