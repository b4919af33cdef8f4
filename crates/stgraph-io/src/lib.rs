//! File I/O for the stgraph pipeline: dataset registry, raw signal and edge
//! readers, the durable cache store, and JSON/NumPy result artifacts.

mod cache;
mod edges;
mod error;
mod registry;
mod signal;
mod writer;

pub use cache::{CACHE_FORMAT_VERSION, FileCacheStore};
pub use edges::EdgeReader;
pub use error::IoError;
pub use registry::{DatasetEntry, DatasetRegistry, DatasetSource};
pub use signal::SignalReader;
pub use writer::{ResultWriter, SplitSummary};
