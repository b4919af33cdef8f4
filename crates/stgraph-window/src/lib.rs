//! Sliding-window statistics, split datasets, and batching for sensor series.
//!
//! A raw `[time, node, channel]` signal is cut into train, validation, and
//! test ranges. Each range gets its own scalar mean and standard deviation
//! from the windowed statistics channel, and a [`SplitDataset`] serves
//! normalized `(x, y)` samples from it on demand.

mod batch;
mod dataset;
mod error;
mod split;
mod window;

pub use batch::{Batch, Batcher};
pub use dataset::{Sample, SplitDataset};
pub use error::WindowError;
pub use split::{SplitBounds, SplitConfig, SplitPolicy, SplitStatistics, Splits, StatsChannel, generate_splits};
pub use window::{WindowConfig, WindowStats};
