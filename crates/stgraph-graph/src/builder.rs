//! Graph builder: raw signal and edges to semantic and spatial adjacency.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use tracing::{debug, info, instrument};

use crate::aligner::Aligner;
use crate::cache::{CacheKind, CacheStore};
use crate::config::GraphConfig;
use crate::dataset::{DatasetId, Edge};
use crate::error::GraphError;
use crate::normalize::normalize_adjacency;
use crate::semantic::{daily_profiles, pairwise_costs, semantic_adjacency};
use crate::signal::{ChannelStats, channel_statistics, normalize_channels};
use crate::spatial::{distance_matrix, spatial_adjacency};

/// Everything produced by one [`GraphBuilder::build`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOutput {
    /// Channel-normalized copy of the raw signal, `[time, node, channel]`.
    pub normalized: Array3<f64>,
    /// Statistics used for the normalization, one entry per channel.
    pub channel_stats: Vec<ChannelStats>,
    /// Mean of channel 0.
    pub signal_mean: f64,
    /// Standard deviation of channel 0.
    pub signal_std: f64,
    /// Binary DTW-similarity adjacency.
    pub semantic: Array2<f64>,
    /// Thresholded Gaussian-kernel distance adjacency.
    pub spatial: Array2<f64>,
}

impl GraphOutput {
    /// Number of sensor nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.semantic.nrows()
    }

    /// Propagation matrix of the semantic graph.
    ///
    /// # Errors
    ///
    /// Propagates [`normalize_adjacency`] errors.
    pub fn semantic_propagation(&self) -> Result<Array2<f64>, GraphError> {
        normalize_adjacency(self.semantic.view())
    }

    /// Propagation matrix of the spatial graph.
    ///
    /// # Errors
    ///
    /// Propagates [`normalize_adjacency`] errors.
    pub fn spatial_propagation(&self) -> Result<Array2<f64>, GraphError> {
        normalize_adjacency(self.spatial.view())
    }
}

/// Average number of undirected links per node, `count(A > 0) / 2 / N`.
///
/// Returns 0 for an empty matrix.
#[must_use]
pub fn average_degree(adjacency: ArrayView2<'_, f64>) -> f64 {
    let n = adjacency.nrows();
    if n == 0 {
        return 0.0;
    }
    let links = adjacency.iter().filter(|&&w| w > 0.0).count();
    links as f64 / 2.0 / n as f64
}

/// Builds both sensor graphs, reusing cached distance matrices when present.
///
/// Generic over the cache backend and the alignment capability so tests can
/// swap in fakes. Both parameters also accept references.
#[derive(Debug)]
pub struct GraphBuilder<C, A> {
    config: GraphConfig,
    cache: C,
    aligner: A,
}

impl<C, A> GraphBuilder<C, A>
where
    C: CacheStore,
    A: Aligner,
{
    /// Create a builder after validating `config`.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphConfig::validate`] errors.
    pub fn new(config: GraphConfig, cache: C, aligner: A) -> Result<Self, GraphError> {
        config.validate()?;
        Ok(Self {
            config,
            cache,
            aligner,
        })
    }

    /// Return the graph configuration.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Return the cache backend.
    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Normalize `signal` and build the semantic and spatial adjacency.
    ///
    /// `signal` is `[time, node, channel]`; `edges` index into its node axis.
    /// The DTW cost matrix and the raw distance matrix are read from the
    /// cache when present and computed then stored otherwise. Edges are only
    /// inspected when the distance matrix has to be computed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`GraphError::EmptySignal`] | Any axis of `signal` has length 0 |
    /// | [`GraphError::TooShortForProfile`] | DTW cache miss and fewer than `day_steps` time steps |
    /// | [`GraphError::EdgeOutOfRange`] | Distance cache miss and an edge references a missing node |
    /// | [`GraphError::NonFiniteDistance`] | Distance cache miss and an edge distance is not finite |
    /// | [`GraphError::CacheCorruption`] | A cached matrix is not `N x N` |
    /// | [`GraphError::CacheStore`] | The cache backend failed |
    /// | [`GraphError::Dtw`] | The aligner rejected a profile pair |
    #[instrument(skip_all, fields(dataset = %dataset, shape = ?signal.shape()))]
    pub fn build(
        &self,
        dataset: &DatasetId,
        signal: ArrayView3<'_, f64>,
        edges: &[Edge],
    ) -> Result<GraphOutput, GraphError> {
        let (steps, n_nodes, channels) = signal.dim();
        if steps == 0 || n_nodes == 0 || channels == 0 {
            return Err(GraphError::EmptySignal {
                shape: [steps, n_nodes, channels],
            });
        }

        let channel_stats = channel_statistics(signal);
        let normalized = normalize_channels(signal, &channel_stats);
        let ChannelStats {
            mean: signal_mean,
            std: signal_std,
        } = channel_stats[0];
        debug!(signal_mean, signal_std, "signal normalized");

        let costs = self.cached_or_compute(dataset, CacheKind::DtwDistance, n_nodes, || {
            let profiles = daily_profiles(normalized.view(), self.config.day_steps)?;
            pairwise_costs(&profiles, &self.aligner, self.config.dtw_radius)
        })?;
        let semantic = semantic_adjacency(&costs, self.config.sigma_semantic, self.config.thresh_semantic);

        let distances = self.cached_or_compute(dataset, CacheKind::SpatialDistance, n_nodes, || {
            distance_matrix(n_nodes, edges)
        })?;
        let spatial = spatial_adjacency(&distances, self.config.sigma_spatial, self.config.thresh_spatial);

        info!(
            semantic_degree = average_degree(semantic.view()),
            spatial_degree = average_degree(spatial.view()),
            "graphs built"
        );

        Ok(GraphOutput {
            normalized,
            channel_stats,
            signal_mean,
            signal_std,
            semantic,
            spatial,
        })
    }

    fn cached_or_compute<F>(
        &self,
        dataset: &DatasetId,
        kind: CacheKind,
        n_nodes: usize,
        compute: F,
    ) -> Result<Array2<f64>, GraphError>
    where
        F: FnOnce() -> Result<Array2<f64>, GraphError>,
    {
        let store_error = |source: C::Error| GraphError::CacheStore {
            dataset: dataset.to_string(),
            kind,
            source: Box::new(source),
        };

        if let Some(matrix) = self.cache.get(dataset, kind).map_err(store_error)? {
            let (rows, cols) = matrix.dim();
            if rows != n_nodes || cols != n_nodes {
                return Err(GraphError::CacheCorruption {
                    dataset: dataset.to_string(),
                    kind,
                    expected: n_nodes,
                    rows,
                    cols,
                });
            }
            info!(%kind, "cache hit");
            return Ok(matrix);
        }

        info!(%kind, "cache miss, computing");
        let matrix = compute()?;
        self.cache.put(dataset, kind, &matrix).map_err(store_error)?;
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ndarray::{Array3, array};
    use stgraph_dtw::DtwError;

    use super::*;
    use crate::aligner::BandedDtw;
    use crate::cache::MemoryCacheStore;

    #[derive(Default)]
    struct CountingAligner {
        calls: AtomicUsize,
        inner: BandedDtw,
    }

    impl Aligner for CountingAligner {
        fn align(&self, a: &[f64], b: &[f64], radius: usize) -> Result<f64, DtwError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.align(a, b, radius)
        }
    }

    fn config() -> GraphConfig {
        GraphConfig::new().with_day_steps(4).with_dtw_radius(2)
    }

    /// Two days of 4 steps, 3 nodes, 2 channels. Nodes 0 and 1 share a shape.
    fn signal() -> Array3<f64> {
        Array3::from_shape_fn((8, 3, 2), |(t, n, c)| {
            let phase = (t % 4) as f64;
            let base = match n {
                0 => phase,
                1 => phase + 0.1,
                _ => 10.0 - 3.0 * phase,
            };
            if c == 0 { base + t as f64 * 0.01 } else { 5.0 }
        })
    }

    fn edges() -> Vec<Edge> {
        vec![Edge::new(0, 1, 120.0), Edge::new(1, 2, 480.0)]
    }

    fn dataset() -> DatasetId {
        DatasetId::new("synthetic").unwrap()
    }

    #[test]
    fn warm_cache_skips_alignment_and_reproduces_output() {
        let store = MemoryCacheStore::new();
        let aligner = CountingAligner::default();
        let builder = GraphBuilder::new(config(), &store, &aligner).unwrap();
        let signal = signal();

        let cold = builder.build(&dataset(), signal.view(), &edges()).unwrap();
        assert_eq!(aligner.calls.load(Ordering::Relaxed), 6);
        assert!(store.contains(&dataset(), CacheKind::DtwDistance));
        assert!(store.contains(&dataset(), CacheKind::SpatialDistance));

        let warm = builder.build(&dataset(), signal.view(), &edges()).unwrap();
        assert_eq!(aligner.calls.load(Ordering::Relaxed), 6);
        assert_eq!(cold, warm);
    }

    #[test]
    fn outputs_are_symmetric_and_in_range() {
        let out = GraphBuilder::new(config(), MemoryCacheStore::new(), BandedDtw::new())
            .unwrap()
            .build(&dataset(), signal().view(), &edges())
            .unwrap();
        assert_eq!(out.n_nodes(), 3);
        assert_eq!(out.semantic, out.semantic.t());
        assert_eq!(out.spatial, out.spatial.t());
        assert!(out.semantic.iter().all(|&v| v == 0.0 || v == 1.0));
        assert!(out.spatial.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(out.channel_stats.len(), 2);
        assert_eq!(out.signal_mean, out.channel_stats[0].mean);
        assert_eq!(out.channel_stats[1].std, 0.0);
    }

    #[test]
    fn caller_signal_is_untouched_and_copy_is_normalized() {
        let signal = signal();
        let before = signal.clone();
        let out = GraphBuilder::new(config(), MemoryCacheStore::new(), BandedDtw::new())
            .unwrap()
            .build(&dataset(), signal.view(), &edges())
            .unwrap();
        assert_eq!(signal, before);
        let recovered = out.normalized[[3, 2, 0]] * out.signal_std + out.signal_mean;
        assert!((recovered - signal[[3, 2, 0]]).abs() < 1e-12);
        // constant channel is centered only
        assert!(out.normalized.index_axis(ndarray::Axis(2), 1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn isolated_node_has_empty_spatial_row() {
        let out = GraphBuilder::new(config(), MemoryCacheStore::new(), BandedDtw::new())
            .unwrap()
            .build(&dataset(), signal().view(), &[Edge::new(0, 1, 50.0)])
            .unwrap();
        assert!(out.spatial.row(2).iter().all(|&v| v == 0.0));
        assert!(out.spatial.column(2).iter().all(|&v| v == 0.0));
        assert_eq!(out.spatial[[0, 1]], 1.0);
    }

    #[test]
    fn mismatched_cache_entry_is_corruption() {
        let store = MemoryCacheStore::new();
        store
            .put(&dataset(), CacheKind::DtwDistance, &Array2::zeros((2, 2)))
            .unwrap();
        let result = GraphBuilder::new(config(), &store, BandedDtw::new())
            .unwrap()
            .build(&dataset(), signal().view(), &edges());
        assert!(matches!(
            result,
            Err(GraphError::CacheCorruption {
                kind: CacheKind::DtwDistance,
                expected: 3,
                rows: 2,
                cols: 2,
                ..
            })
        ));
    }

    #[test]
    fn datasets_do_not_share_entries() {
        let store = MemoryCacheStore::new();
        let aligner = CountingAligner::default();
        let builder = GraphBuilder::new(config(), &store, &aligner).unwrap();
        builder.build(&dataset(), signal().view(), &edges()).unwrap();
        builder
            .build(&DatasetId::new("other").unwrap(), signal().view(), &edges())
            .unwrap();
        assert_eq!(aligner.calls.load(Ordering::Relaxed), 12);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn edge_outside_node_range_is_rejected() {
        let result = GraphBuilder::new(config(), MemoryCacheStore::new(), BandedDtw::new())
            .unwrap()
            .build(&dataset(), signal().view(), &[Edge::new(0, 3, 1.0)]);
        assert!(matches!(result, Err(GraphError::EdgeOutOfRange { to: 3, n_nodes: 3, .. })));
    }

    #[test]
    fn short_signal_fails_before_alignment() {
        let aligner = CountingAligner::default();
        let short = Array3::<f64>::ones((3, 2, 1));
        let result = GraphBuilder::new(config(), MemoryCacheStore::new(), &aligner)
            .unwrap()
            .build(&dataset(), short.view(), &[]);
        assert!(matches!(
            result,
            Err(GraphError::TooShortForProfile { steps: 3, day_steps: 4 })
        ));
        assert_eq!(aligner.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn empty_signal_is_rejected() {
        let empty = Array3::<f64>::zeros((8, 0, 1));
        let result = GraphBuilder::new(config(), MemoryCacheStore::new(), BandedDtw::new())
            .unwrap()
            .build(&dataset(), empty.view(), &[]);
        assert!(matches!(result, Err(GraphError::EmptySignal { shape: [8, 0, 1] })));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let result = GraphBuilder::new(
            GraphConfig::new().with_sigma_semantic(0.0),
            MemoryCacheStore::new(),
            BandedDtw::new(),
        );
        assert!(matches!(result, Err(GraphError::InvalidSigma { .. })));
    }

    #[test]
    fn average_degree_counts_undirected_links() {
        let a = array![[0.0, 1.0, 0.5], [1.0, 0.0, 0.0], [0.5, 0.0, 0.0]];
        assert!((average_degree(a.view()) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(average_degree(Array2::<f64>::zeros((0, 0)).view()), 0.0);
    }

    #[test]
    fn propagation_matrices_follow_adjacency() {
        let out = GraphBuilder::new(config(), MemoryCacheStore::new(), BandedDtw::new())
            .unwrap()
            .build(&dataset(), signal().view(), &edges())
            .unwrap();
        let p = out.spatial_propagation().unwrap();
        assert_eq!(p.dim(), (3, 3));
        assert!(p.diag().iter().all(|&d| d >= 0.4));
        assert!(out.semantic_propagation().is_ok());
    }
}
