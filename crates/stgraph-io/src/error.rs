//! I/O error types for stgraph-io.

use std::path::PathBuf;

use stgraph_graph::{CacheKind, GraphError};

/// Errors from dataset resolution, file reading, caching, and artifact writing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a dataset name is not in the registry.
    #[error("unknown dataset \"{name}\", known datasets: {known}")]
    UnknownDataset {
        /// The requested name.
        name: String,
        /// Comma-separated registered names.
        known: String,
    },

    /// Returned when the registry file cannot be read.
    #[error("cannot read dataset registry {path}")]
    RegistryRead {
        /// Path to the registry file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the registry file is not a valid JSON name-to-entry map.
    #[error("invalid dataset registry {path}")]
    RegistryParse {
        /// Path to the registry file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a raw signal or edge file does not exist.
    #[error("raw data file not found: {path}")]
    MissingRawFile {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// Returned when an existing input file cannot be opened.
    #[error("cannot open {path}")]
    FileOpen {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a `.npy` file cannot be decoded.
    #[error("cannot read npy array from {path}")]
    NpyRead {
        /// Path to the `.npy` file.
        path: PathBuf,
        /// Underlying decoder error.
        source: ndarray_npy::ReadNpyError,
    },

    /// Returned when a `.npz` archive cannot be decoded.
    #[error("cannot read npz archive {path}")]
    NpzRead {
        /// Path to the `.npz` file.
        path: PathBuf,
        /// Underlying decoder error.
        source: ndarray_npy::ReadNpzError,
    },

    /// Returned when a `.npz` archive has no `data` array.
    #[error("npz archive {path} has no \"{name}\" array (found {available:?})")]
    MissingNpzArray {
        /// Path to the `.npz` file.
        path: PathBuf,
        /// Array name that was looked up.
        name: &'static str,
        /// Arrays present in the archive.
        available: Vec<String>,
    },

    /// Returned when the raw signal is neither `[time, node]` nor `[time, node, channel]`.
    #[error("unsupported signal shape {shape:?} in {path}, expected 2 or 3 axes")]
    UnsupportedShape {
        /// Path to the signal file.
        path: PathBuf,
        /// Shape found in the file.
        shape: Vec<usize>,
    },

    /// Returned when the raw signal holds NaN or infinite values.
    #[error("non-finite value in {path} at [time {time}, node {node}, channel {channel}]")]
    NonFiniteSignal {
        /// Path to the signal file.
        path: PathBuf,
        /// Time index of the first offending value.
        time: usize,
        /// Node index of the first offending value.
        node: usize,
        /// Channel index of the first offending value.
        channel: usize,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when an edge row is not `from,to,distance`.
    #[error("invalid edge row {row_index} in {path}: {reason} (\"{raw}\")")]
    InvalidEdgeRow {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// What was wrong with the row.
        reason: &'static str,
        /// The raw row text.
        raw: String,
    },

    /// Returned when the cache directory cannot be created.
    #[error("cannot create cache directory {path}")]
    CacheDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a cache file exists but cannot be read.
    #[error("cannot read cache file {path}")]
    CacheRead {
        /// Path to the cache file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a cache file cannot be written or moved into place.
    #[error("cannot write cache file {path}")]
    CacheWrite {
        /// Path to the cache file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a cache file is not a valid envelope.
    #[error("corrupt cache file {path}")]
    CacheDecode {
        /// Path to the cache file.
        path: PathBuf,
        /// Underlying decoder error.
        source: bincode::Error,
    },

    /// Returned when a cache envelope cannot be encoded.
    #[error("cannot encode cache entry for {path}")]
    CacheEncode {
        /// Path to the cache file.
        path: PathBuf,
        /// Underlying encoder error.
        source: bincode::Error,
    },

    /// Returned when a cache file was written by an incompatible format version.
    #[error("cache file {path} has format version {found}, expected {expected}")]
    CacheVersion {
        /// Path to the cache file.
        path: PathBuf,
        /// Version stored in the file.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },

    /// Returned when a cache file holds another dataset's or kind's matrix.
    #[error("cache file {path} holds {found_kind} for {found_dataset}, expected {expected_kind} for {expected_dataset}")]
    CacheIdentity {
        /// Path to the cache file.
        path: PathBuf,
        /// Dataset the file should hold.
        expected_dataset: String,
        /// Dataset recorded in the file.
        found_dataset: String,
        /// Kind the file should hold.
        expected_kind: CacheKind,
        /// Kind recorded in the file.
        found_kind: CacheKind,
    },

    /// Returned when the stored values do not fill an `n x n` matrix.
    #[error("cache file {path} declares {n}x{n} but holds {values} values")]
    CacheShape {
        /// Path to the cache file.
        path: PathBuf,
        /// Declared node count.
        n: usize,
        /// Number of stored values.
        values: usize,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a JSON artifact cannot be serialized.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a matrix cannot be written as `.npy`.
    #[error("cannot write npy array {path}")]
    NpyWrite {
        /// Path of the `.npy` file.
        path: PathBuf,
        /// Underlying encoder error.
        source: ndarray_npy::WriteNpyError,
    },

    /// Wraps a graph-layer error such as an invalid dataset id.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
