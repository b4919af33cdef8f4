//! Semantic graph: DTW similarity between average daily profiles.

use ndarray::{Array2, ArrayView3, Axis, s};
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::aligner::Aligner;
use crate::error::GraphError;
use crate::kernel::{Moments, gaussian};

/// Average the normalized primal channel over complete days.
///
/// Returns one profile of length `day_steps` per node. A trailing partial day
/// is ignored.
pub(crate) fn daily_profiles(
    normalized: ArrayView3<'_, f64>,
    day_steps: usize,
) -> Result<Vec<Vec<f64>>, GraphError> {
    let (steps, n_nodes, _) = normalized.dim();
    let n_days = steps / day_steps;
    if n_days == 0 {
        return Err(GraphError::TooShortForProfile { steps, day_steps });
    }

    let primal = normalized.index_axis(Axis(2), 0);
    let mut sums = Array2::<f64>::zeros((day_steps, n_nodes));
    for day in 0..n_days {
        sums += &primal.slice(s![day * day_steps..(day + 1) * day_steps, ..]);
    }
    sums /= n_days as f64;
    debug!(n_days, day_steps, "daily profiles averaged");

    Ok(sums.columns().into_iter().map(|profile| profile.to_vec()).collect())
}

/// Alignment cost for every unordered node pair.
///
/// The upper triangle including the diagonal is computed as a parallel map;
/// each cell comes from exactly one pure call and is mirrored afterwards, so
/// the result does not depend on scheduling.
#[instrument(skip_all, fields(n_nodes = profiles.len(), radius = radius))]
pub(crate) fn pairwise_costs<A>(
    profiles: &[Vec<f64>],
    aligner: &A,
    radius: usize,
) -> Result<Array2<f64>, GraphError>
where
    A: Aligner + ?Sized,
{
    let n = profiles.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();

    let costs: Vec<f64> = pairs
        .par_iter()
        .map(|&(i, j)| aligner.align(&profiles[i], &profiles[j], radius))
        .collect::<Result<_, _>>()?;

    let mut matrix = Array2::zeros((n, n));
    for (&(i, j), &cost) in pairs.iter().zip(&costs) {
        matrix[[i, j]] = cost;
        matrix[[j, i]] = cost;
    }
    Ok(matrix)
}

/// Standardize the cost matrix globally, apply the Gaussian kernel, and binarize.
///
/// Entries whose kernel response exceeds `thresh` become 1, all others 0.
/// Costs without spread carry no similarity signal and give an empty graph.
pub(crate) fn semantic_adjacency(costs: &Array2<f64>, sigma: f64, thresh: f64) -> Array2<f64> {
    let Some(moments) = Moments::of(costs.iter().copied()).filter(Moments::has_spread) else {
        if !costs.is_empty() {
            warn!(n_nodes = costs.nrows(), "DTW costs have no spread, semantic graph is empty");
        }
        return Array2::zeros(costs.raw_dim());
    };
    costs.mapv(|c| if gaussian(moments.z(c), sigma) > thresh { 1.0 } else { 0.0 })
}
