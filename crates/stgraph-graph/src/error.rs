//! Error types for graph construction.

use stgraph_dtw::DtwError;

use crate::cache::CacheKind;

/// Errors from graph construction, normalization, and cache access.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Returned when a dataset name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid dataset id \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidDatasetId {
        /// The invalid name.
        name: String,
    },

    /// Returned when a kernel width is zero, negative, or not finite.
    #[error("{name} must be finite and positive, got {value}")]
    InvalidSigma {
        /// Which kernel width was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when a threshold is not finite.
    #[error("{name} must be finite, got {value}")]
    InvalidThreshold {
        /// Which threshold was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when the daily block size is zero.
    #[error("day_steps must be at least 1, got {day_steps}")]
    InvalidDaySteps {
        /// The invalid block size.
        day_steps: usize,
    },

    /// Returned when the raw signal has a zero-length axis.
    #[error("raw signal must be non-empty on every axis, got shape {shape:?}")]
    EmptySignal {
        /// Shape `[time, node, channel]` of the rejected signal.
        shape: [usize; 3],
    },

    /// Returned when the signal holds less than one complete daily block.
    #[error("signal has {steps} steps, need at least one day of {day_steps} steps for the daily profile")]
    TooShortForProfile {
        /// Number of time steps in the signal.
        steps: usize,
        /// Configured steps per day.
        day_steps: usize,
    },

    /// Returned when an edge references a node outside `[0, n_nodes)`.
    #[error("edge {position} ({from} -> {to}) references a node outside [0, {n_nodes})")]
    EdgeOutOfRange {
        /// Zero-based position of the edge in the edge list.
        position: usize,
        /// Start node of the edge.
        from: usize,
        /// End node of the edge.
        to: usize,
        /// Node count of the raw signal.
        n_nodes: usize,
    },

    /// Returned when an edge distance is NaN or infinite.
    #[error("edge {position} ({from} -> {to}) has non-finite distance {distance}")]
    NonFiniteDistance {
        /// Zero-based position of the edge in the edge list.
        position: usize,
        /// Start node of the edge.
        from: usize,
        /// End node of the edge.
        to: usize,
        /// The rejected distance.
        distance: f64,
    },

    /// Returned when a cached matrix does not match the current node count.
    #[error("cached {kind} matrix for {dataset} is {rows}x{cols}, expected {expected}x{expected}")]
    CacheCorruption {
        /// Dataset whose cache entry is inconsistent.
        dataset: String,
        /// Which cached matrix is inconsistent.
        kind: CacheKind,
        /// Node count of the current raw signal.
        expected: usize,
        /// Rows of the cached matrix.
        rows: usize,
        /// Columns of the cached matrix.
        cols: usize,
    },

    /// Wraps a failure reported by the cache store backend.
    #[error("cache store failed on {kind} for {dataset}")]
    CacheStore {
        /// Dataset being read or written.
        dataset: String,
        /// Which cached matrix was being accessed.
        kind: CacheKind,
        /// Underlying backend error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Returned when an adjacency matrix is not square.
    #[error("adjacency matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Wraps an alignment error from the DTW capability.
    #[error("DTW alignment failed: {0}")]
    Dtw(#[from] DtwError),
}
