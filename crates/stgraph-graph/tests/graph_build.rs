use ndarray::{Array2, Array3};
use stgraph_graph::{
    BandedDtw, CacheKind, CacheStore, DatasetId, Edge, GraphBuilder, GraphConfig, GraphError, MemoryCacheStore,
    average_degree, normalize_adjacency,
};

/// Three days of 6 steps over 5 sensors on a line, one speed channel.
fn corridor() -> (Array3<f64>, Vec<Edge>) {
    let signal = Array3::from_shape_fn((18, 5, 1), |(t, n, _)| {
        let phase = (t % 6) as f64;
        let peak = if n < 3 { 2.0 } else { 4.0 };
        60.0 - 10.0 * (-(phase - peak).powi(2)).exp() + n as f64 * 0.5
    });
    let edges = (0..4).map(|i| Edge::new(i, i + 1, 400.0 + 100.0 * i as f64)).collect();
    (signal, edges)
}

#[test]
fn build_then_normalize_both_graphs() {
    let (signal, edges) = corridor();
    let cfg = GraphConfig::new().with_day_steps(6);
    let builder = GraphBuilder::new(cfg, MemoryCacheStore::new(), BandedDtw::new()).unwrap();
    let out = builder.build(&DatasetId::new("corridor").unwrap(), signal.view(), &edges).unwrap();

    for adjacency in [&out.semantic, &out.spatial] {
        assert_eq!(adjacency.dim(), (5, 5));
        let p = normalize_adjacency(adjacency.view()).unwrap();
        for i in 0..5 {
            assert!(p[[i, i]] >= 0.4);
            for j in 0..5 {
                assert_eq!(p[[i, j]], p[[j, i]]);
                assert!(p[[i, j]] >= 0.0);
            }
        }
    }

    // non-adjacent sensors have no spatial link
    assert_eq!(out.spatial[[0, 2]], 0.0);
    assert_eq!(out.spatial[[0, 4]], 0.0);
    assert!(average_degree(out.spatial.view()) <= 2.0);
}

#[test]
fn precomputed_cache_entries_are_used_verbatim() {
    let (signal, _) = corridor();
    let dataset = DatasetId::new("seeded").unwrap();
    let store = MemoryCacheStore::new();

    let costs = Array2::from_shape_fn((5, 5), |(i, j)| i.abs_diff(j) as f64);
    store.put(&dataset, CacheKind::DtwDistance, &costs).unwrap();
    let mut distances = Array2::from_elem((5, 5), f64::INFINITY);
    distances[[0, 4]] = 10.0;
    distances[[4, 0]] = 10.0;
    store.put(&dataset, CacheKind::SpatialDistance, &distances).unwrap();

    // the edge list is only read on a cache miss
    let cfg = GraphConfig::new().with_day_steps(6);
    let out = GraphBuilder::new(cfg, &store, BandedDtw::new())
        .unwrap()
        .build(&dataset, signal.view(), &[Edge::new(0, 99, 1.0)])
        .unwrap();

    assert_eq!(out.spatial[[0, 4]], 1.0);
    assert_eq!(out.spatial.iter().filter(|&&w| w > 0.0).count(), 2);
    assert_eq!(out.semantic, out.semantic.t());
}

struct BrokenStore;

impl CacheStore for BrokenStore {
    type Error = std::io::Error;

    fn get(&self, _: &DatasetId, _: CacheKind) -> Result<Option<Array2<f64>>, Self::Error> {
        Err(std::io::Error::other("disk on fire"))
    }

    fn put(&self, _: &DatasetId, _: CacheKind, _: &Array2<f64>) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn cache_backend_failure_is_surfaced() {
    let (signal, edges) = corridor();
    let cfg = GraphConfig::new().with_day_steps(6);
    let result = GraphBuilder::new(cfg, BrokenStore, BandedDtw::new())
        .unwrap()
        .build(&DatasetId::new("broken").unwrap(), signal.view(), &edges);
    match result {
        Err(GraphError::CacheStore { dataset, kind, source }) => {
            assert_eq!(dataset, "broken");
            assert_eq!(kind, CacheKind::DtwDistance);
            assert_eq!(source.to_string(), "disk on fire");
        }
        other => panic!("expected cache store error, got {other:?}"),
    }
}
