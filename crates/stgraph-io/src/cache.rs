//! Durable cache store: one bincode envelope per dataset and matrix kind.

use std::borrow::Cow;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use stgraph_graph::{CacheKind, CacheStore, DatasetId};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::IoError;

/// Envelope format written by this build.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CacheEnvelope<'a> {
    format_version: u32,
    dataset: Cow<'a, str>,
    kind: CacheKind,
    n: usize,
    values: Cow<'a, [f64]>,
}

/// Stores matrices as `{dir}/{dataset}_{kind}.bin`.
///
/// Writes go to a temporary file in the cache directory that is renamed into
/// place, so readers see either no entry or a complete one. Concurrent
/// writers of the same entry write identical bytes; no locking is done.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CacheDirCreate`] if the directory cannot be created.
    pub fn new(dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(dir).map_err(|e| IoError::CacheDirCreate {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Return the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the `kind` matrix of `dataset`.
    #[must_use]
    pub fn entry_path(&self, dataset: &DatasetId, kind: CacheKind) -> PathBuf {
        self.dir.join(format!("{}_{}.bin", dataset.as_str(), kind.as_str()))
    }
}

impl CacheStore for FileCacheStore {
    type Error = IoError;

    #[instrument(skip(self, dataset), fields(dataset = %dataset))]
    fn get(&self, dataset: &DatasetId, kind: CacheKind) -> Result<Option<Array2<f64>>, IoError> {
        let path = self.entry_path(dataset, kind);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IoError::CacheRead { path, source: e }),
        };

        // Decoding from a slice bounds every length prefix by the file size.
        let envelope: CacheEnvelope<'_> = bincode::deserialize(&bytes).map_err(|e| IoError::CacheDecode {
            path: path.clone(),
            source: e,
        })?;

        if envelope.format_version != CACHE_FORMAT_VERSION {
            return Err(IoError::CacheVersion {
                path,
                found: envelope.format_version,
                expected: CACHE_FORMAT_VERSION,
            });
        }
        if envelope.dataset != dataset.as_str() || envelope.kind != kind {
            return Err(IoError::CacheIdentity {
                path,
                expected_dataset: dataset.to_string(),
                found_dataset: envelope.dataset.into_owned(),
                expected_kind: kind,
                found_kind: envelope.kind,
            });
        }

        let n = envelope.n;
        let values = envelope.values.into_owned();
        if n.checked_mul(n) != Some(values.len()) {
            return Err(IoError::CacheShape {
                path,
                n,
                values: values.len(),
            });
        }
        let matrix = Array2::from_shape_vec((n, n), values).map_err(|_| IoError::CacheShape {
            path: path.clone(),
            n,
            values: n * n,
        })?;
        debug!(path = %path.display(), n, "cache entry read");
        Ok(Some(matrix))
    }

    #[instrument(skip(self, dataset, matrix), fields(dataset = %dataset, n = matrix.nrows()))]
    fn put(&self, dataset: &DatasetId, kind: CacheKind, matrix: &Array2<f64>) -> Result<(), IoError> {
        let path = self.entry_path(dataset, kind);
        let values = match matrix.as_slice() {
            Some(slice) => Cow::Borrowed(slice),
            None => Cow::Owned(matrix.iter().copied().collect()),
        };
        let envelope = CacheEnvelope {
            format_version: CACHE_FORMAT_VERSION,
            dataset: Cow::Borrowed(dataset.as_str()),
            kind,
            n: matrix.nrows(),
            values,
        };
        let bytes = bincode::serialize(&envelope).map_err(|e| IoError::CacheEncode {
            path: path.clone(),
            source: e,
        })?;

        let write_error = |source| IoError::CacheWrite {
            path: path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        tmp.write_all(&bytes).map_err(write_error)?;
        tmp.as_file().sync_all().map_err(write_error)?;
        tmp.persist(&path).map_err(|e| write_error(e.error))?;
        debug!(path = %path.display(), bytes = bytes.len(), "cache entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use tempfile::TempDir;

    use super::*;

    fn id(name: &str) -> DatasetId {
        DatasetId::new(name).unwrap()
    }

    #[test]
    fn absent_entry_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        assert!(store.get(&id("pems04"), CacheKind::DtwDistance).unwrap().is_none());
    }

    #[test]
    fn entry_file_naming() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        assert_eq!(
            store.entry_path(&id("pems04"), CacheKind::SpatialDistance),
            dir.path().join("pems04_spatial_distance.bin")
        );
    }

    #[test]
    fn infinite_distances_survive_storage() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        let m = array![[f64::INFINITY, 3.5], [3.5, f64::INFINITY]];
        store.put(&id("bay"), CacheKind::SpatialDistance, &m).unwrap();
        let back = store.get(&id("bay"), CacheKind::SpatialDistance).unwrap().unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn transposed_view_is_stored_in_logical_order() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        let m = array![[1.0, 2.0], [3.0, 4.0]].reversed_axes();
        store.put(&id("t"), CacheKind::DtwDistance, &m).unwrap();
        let back = store.get(&id("t"), CacheKind::DtwDistance).unwrap().unwrap();
        assert_eq!(back, array![[1.0, 3.0], [2.0, 4.0]]);
    }

    #[test]
    fn overwrite_replaces_entry_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        store.put(&id("d"), CacheKind::DtwDistance, &array![[0.0]]).unwrap();
        store.put(&id("d"), CacheKind::DtwDistance, &array![[0.0]]).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        let path = store.entry_path(&id("x"), CacheKind::DtwDistance);
        fs::write(&path, b"not a cache file").unwrap();
        assert!(matches!(
            store.get(&id("x"), CacheKind::DtwDistance),
            Err(IoError::CacheDecode { .. })
        ));
    }

    #[test]
    fn copied_file_is_identity_error() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        store.put(&id("a"), CacheKind::DtwDistance, &array![[0.0]]).unwrap();
        fs::copy(
            store.entry_path(&id("a"), CacheKind::DtwDistance),
            store.entry_path(&id("b"), CacheKind::DtwDistance),
        )
        .unwrap();
        match store.get(&id("b"), CacheKind::DtwDistance) {
            Err(IoError::CacheIdentity {
                expected_dataset,
                found_dataset,
                ..
            }) => {
                assert_eq!(expected_dataset, "b");
                assert_eq!(found_dataset, "a");
            }
            other => panic!("expected identity error, got {other:?}"),
        }
    }

    #[test]
    fn version_and_shape_are_checked() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();

        let old = CacheEnvelope {
            format_version: 0,
            dataset: Cow::Borrowed("v"),
            kind: CacheKind::DtwDistance,
            n: 1,
            values: Cow::Owned(vec![0.0]),
        };
        fs::write(
            store.entry_path(&id("v"), CacheKind::DtwDistance),
            bincode::serialize(&old).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            store.get(&id("v"), CacheKind::DtwDistance),
            Err(IoError::CacheVersion { found: 0, expected: 1, .. })
        ));

        let short = CacheEnvelope {
            format_version: CACHE_FORMAT_VERSION,
            dataset: Cow::Borrowed("s"),
            kind: CacheKind::SpatialDistance,
            n: 3,
            values: Cow::Owned(vec![0.0; 4]),
        };
        fs::write(
            store.entry_path(&id("s"), CacheKind::SpatialDistance),
            bincode::serialize(&short).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            store.get(&id("s"), CacheKind::SpatialDistance),
            Err(IoError::CacheShape { n: 3, values: 4, .. })
        ));
    }
}
