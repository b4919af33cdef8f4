//! Sensor graph construction for spatio-temporal forecasting.
//!
//! Builds a semantic adjacency matrix from DTW similarity between per-node
//! daily profiles and a spatial adjacency matrix from physical sensor
//! distances, both through a Gaussian kernel and threshold. The expensive
//! intermediate matrices go through an injectable [`CacheStore`]; the DTW
//! capability goes through the [`Aligner`] seam.

mod aligner;
mod builder;
mod cache;
mod config;
mod dataset;
mod error;
mod kernel;
mod normalize;
mod semantic;
mod signal;
mod spatial;

pub use aligner::{Aligner, BandedDtw};
pub use builder::{GraphBuilder, GraphOutput, average_degree};
pub use cache::{CacheKind, CacheStore, MemoryCacheStore};
pub use config::GraphConfig;
pub use dataset::{DatasetId, Edge};
pub use error::GraphError;
pub use normalize::{ALPHA, DEGREE_FLOOR, normalize_adjacency};
pub use signal::{ChannelStats, channel_statistics, normalize_channels};
pub use stgraph_dtw::{DtwError, LocalCost};
