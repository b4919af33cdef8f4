//! Cache contract for the expensive node-by-node matrices.
//!
//! Entries are keyed by dataset identity and [`CacheKind`]. Backends follow an
//! at-least-once compute, idempotent-overwrite contract: two runs racing on a
//! missing entry both compute it and both write identical content. No mutual
//! exclusion is implied.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetId;

/// Which derived matrix a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheKind {
    /// Pairwise DTW cost between per-node daily profiles.
    DtwDistance,
    /// Raw physical distance, `+inf` where no edge exists.
    SpatialDistance,
}

impl CacheKind {
    /// Stable name used in logs and file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DtwDistance => "dtw_distance",
            Self::SpatialDistance => "spatial_distance",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyed store for dense N×N matrices.
pub trait CacheStore {
    /// Backend error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return the stored matrix, or `None` when no entry exists.
    fn get(&self, dataset: &DatasetId, kind: CacheKind) -> Result<Option<Array2<f64>>, Self::Error>;

    /// Store `matrix`, replacing any existing entry.
    fn put(&self, dataset: &DatasetId, kind: CacheKind, matrix: &Array2<f64>) -> Result<(), Self::Error>;
}

impl<T: CacheStore + ?Sized> CacheStore for &T {
    type Error = T::Error;

    fn get(&self, dataset: &DatasetId, kind: CacheKind) -> Result<Option<Array2<f64>>, Self::Error> {
        (**self).get(dataset, kind)
    }

    fn put(&self, dataset: &DatasetId, kind: CacheKind, matrix: &Array2<f64>) -> Result<(), Self::Error> {
        (**self).put(dataset, kind, matrix)
    }
}

/// In-process cache store. Entries live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<(DatasetId, CacheKind), Array2<f64>>>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return true if an entry exists for `dataset` and `kind`.
    #[must_use]
    pub fn contains(&self, dataset: &DatasetId, kind: CacheKind) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(dataset.clone(), kind))
    }

    /// Return the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Return true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    type Error = Infallible;

    fn get(&self, dataset: &DatasetId, kind: CacheKind) -> Result<Option<Array2<f64>>, Self::Error> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&(dataset.clone(), kind)).cloned())
    }

    fn put(&self, dataset: &DatasetId, kind: CacheKind, matrix: &Array2<f64>) -> Result<(), Self::Error> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert((dataset.clone(), kind), matrix.clone());
        Ok(())
    }
}
