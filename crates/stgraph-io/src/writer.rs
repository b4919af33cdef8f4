//! JSON and NumPy artifacts for graphs and splits.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::Serialize;
use stgraph_graph::{ChannelStats, DatasetId, GraphOutput, average_degree};
use stgraph_window::{Batcher, SplitConfig, SplitDataset, SplitPolicy, Splits};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Writes graph and split results for one dataset.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{dataset}_graphs.json`, `{dataset}_splits.json`,
/// and `{dataset}_{matrix}.npy`.
pub struct ResultWriter {
    output_dir: PathBuf,
    dataset: DatasetId,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and dataset.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), dataset = %dataset))]
    pub fn new(output_dir: &Path, dataset: DatasetId) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            dataset,
        })
    }

    /// Path of `{dataset}_{suffix}` inside the output directory.
    #[must_use]
    pub fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{suffix}", self.dataset.as_str()))
    }

    /// Write both adjacency matrices and their propagation matrices to
    /// `{dataset}_graphs.json`.
    ///
    /// # Errors
    ///
    /// Propagates normalization errors and returns [`IoError::Serialize`] or
    /// [`IoError::WriteFile`] if the file cannot be produced.
    #[instrument(skip_all)]
    pub fn write_graphs(&self, graphs: &GraphOutput) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("graphs.json");
        let artifact = GraphArtifact {
            dataset: self.dataset.as_str(),
            n_nodes: graphs.n_nodes(),
            signal_mean: graphs.signal_mean,
            signal_std: graphs.signal_std,
            channel_stats: &graphs.channel_stats,
            semantic: MatrixEntry::new(&graphs.semantic, &graphs.semantic_propagation()?),
            spatial: MatrixEntry::new(&graphs.spatial, &graphs.spatial_propagation()?),
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "graph result written");
        Ok(path)
    }

    /// Write split bounds, statistics, batch counts, and the epoch batch order
    /// of every split to `{dataset}_splits.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] if the file
    /// cannot be produced.
    #[instrument(skip_all)]
    pub fn write_splits(&self, splits: &Splits<'_>, config: &SplitConfig, batcher: &Batcher) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("splits.json");
        let artifact = SplitArtifact {
            dataset: self.dataset.as_str(),
            policy: config.policy(),
            history_len: config.history_len(),
            predict_len: config.predict_len(),
            batch_size: batcher.batch_size(),
            train: SplitSummary::new(&splits.train, batcher),
            valid: SplitSummary::new(&splits.valid, batcher),
            test: SplitSummary::new(&splits.test, batcher),
            batch_order: BatchOrder {
                train: batcher.batches(splits.train.len()),
                valid: batcher.batches(splits.valid.len()),
                test: batcher.batches(splits.test.len()),
            },
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "split result written");
        Ok(path)
    }

    /// Write a dense matrix to `{dataset}_{name}.npy`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::NpyWrite`] if the file cannot be written.
    #[instrument(skip(self, matrix))]
    pub fn write_matrix(&self, name: &str, matrix: &Array2<f64>) -> Result<PathBuf, IoError> {
        let path = self.artifact_path(&format!("{name}.npy"));
        ndarray_npy::write_npy(&path, matrix).map_err(|e| IoError::NpyWrite {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "matrix written");
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn rows(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct GraphArtifact<'a> {
    dataset: &'a str,
    n_nodes: usize,
    signal_mean: f64,
    signal_std: f64,
    channel_stats: &'a [ChannelStats],
    semantic: MatrixEntry,
    spatial: MatrixEntry,
}

#[derive(Serialize)]
struct MatrixEntry {
    average_degree: f64,
    adjacency: Vec<Vec<f64>>,
    propagation: Vec<Vec<f64>>,
}

impl MatrixEntry {
    fn new(adjacency: &Array2<f64>, propagation: &Array2<f64>) -> Self {
        Self {
            average_degree: average_degree(adjacency.view()),
            adjacency: rows(adjacency),
            propagation: rows(propagation),
        }
    }
}

#[derive(Serialize)]
struct SplitArtifact<'a> {
    dataset: &'a str,
    policy: SplitPolicy,
    history_len: usize,
    predict_len: usize,
    batch_size: usize,
    train: SplitSummary,
    valid: SplitSummary,
    test: SplitSummary,
    batch_order: BatchOrder,
}

#[derive(Serialize)]
struct BatchOrder {
    train: Vec<Vec<usize>>,
    valid: Vec<Vec<usize>>,
    test: Vec<Vec<usize>>,
}

/// Bounds, statistics, and batch count of one split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    /// First time step of the split.
    pub start: usize,
    /// One past the last time step of the split.
    pub end: usize,
    /// Number of samples.
    pub samples: usize,
    /// Number of batches per epoch.
    pub batches: usize,
    /// Split statistics mean.
    pub mean: f64,
    /// Split statistics standard deviation.
    pub std: f64,
}

impl SplitSummary {
    /// Summarize `split` as batched by `batcher`.
    #[must_use]
    pub fn new(split: &SplitDataset<'_>, batcher: &Batcher) -> Self {
        let range = split.range();
        let stats = split.stats();
        Self {
            start: range.start,
            end: range.end,
            samples: split.len(),
            batches: batcher.num_batches(split.len()),
            mean: stats.mean,
            std: stats.std,
        }
    }
}
