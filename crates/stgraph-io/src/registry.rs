//! Dataset name to raw file resolution.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stgraph_graph::DatasetId;
use tracing::{debug, instrument};

use crate::IoError;

/// Raw files of one dataset, relative to a data root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// `.npz` or `.npy` signal file.
    pub signal: PathBuf,
    /// Edge list CSV.
    pub edges: PathBuf,
}

impl DatasetEntry {
    /// Create an entry from signal and edge paths.
    pub fn new(signal: impl Into<PathBuf>, edges: impl Into<PathBuf>) -> Self {
        Self {
            signal: signal.into(),
            edges: edges.into(),
        }
    }
}

/// A registry entry resolved against a data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    /// Dataset identity, keys the cache.
    pub dataset: DatasetId,
    /// Absolute or root-joined signal path.
    pub signal: PathBuf,
    /// Absolute or root-joined edge list path.
    pub edges: PathBuf,
}

/// Known datasets. Passed explicitly; there is no global table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetRegistry {
    entries: BTreeMap<DatasetId, DatasetEntry>,
}

const BUILTIN: [(&str, &str, &str); 7] = [
    ("pems03", "PEMS03/PEMS03.npz", "PEMS03/PEMS03.csv"),
    ("pems04", "PEMS04/PEMS04.npz", "PEMS04/PEMS04.csv"),
    ("pems07", "PEMS07/PEMS07.npz", "PEMS07/PEMS07.csv"),
    ("pems08", "PEMS08/PEMS08.npz", "PEMS08/PEMS08.csv"),
    ("pemsbay", "PEMSBAY/pems_bay.npz", "PEMSBAY/distance.csv"),
    ("pemsD7M", "PeMSD7M/PeMSD7M.npz", "PeMSD7M/distance.csv"),
    ("pemsD7L", "PeMSD7L/PeMSD7L.npz", "PeMSD7L/distance.csv"),
];

impl DatasetRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The PEMS benchmark datasets.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .filter_map(|&(name, signal, edges)| {
                DatasetId::new(name)
                    .ok()
                    .map(|id| (id, DatasetEntry::new(signal, edges)))
            })
            .collect();
        Self { entries }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, dataset: DatasetId, entry: DatasetEntry) {
        self.entries.insert(dataset, entry);
    }

    /// Add or replace entries from a JSON object of `name -> {signal, edges}`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::RegistryRead`] | File cannot be read |
    /// | [`IoError::RegistryParse`] | File is not a JSON object of entries |
    /// | [`IoError::Graph`] | A name is not a valid dataset id |
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn extend_from_json(&mut self, path: &Path) -> Result<(), IoError> {
        let content = fs::read_to_string(path).map_err(|e| IoError::RegistryRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parsed: BTreeMap<String, DatasetEntry> =
            serde_json::from_str(&content).map_err(|e| IoError::RegistryParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(entries = parsed.len(), "registry file parsed");
        for (name, entry) in parsed {
            self.insert(DatasetId::new(name)?, entry);
        }
        Ok(())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(DatasetId::as_str)
    }

    /// Return the entry for `name`, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DatasetEntry> {
        self.entries.get(name)
    }

    /// Resolve `name` to concrete paths under `data_root`. Touches no files.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnknownDataset`] if `name` is not registered.
    pub fn resolve(&self, name: &str, data_root: &Path) -> Result<DatasetSource, IoError> {
        let (dataset, entry) = self
            .entries
            .get_key_value(name)
            .ok_or_else(|| IoError::UnknownDataset {
                name: name.to_string(),
                known: self.names().collect::<Vec<_>>().join(", "),
            })?;
        Ok(DatasetSource {
            dataset: dataset.clone(),
            signal: data_root.join(&entry.signal),
            edges: data_root.join(&entry.edges),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn builtin_table_resolves_under_root() {
        let registry = DatasetRegistry::builtin();
        assert_eq!(registry.names().count(), 7);
        let source = registry.resolve("pems04", Path::new("/data")).unwrap();
        assert_eq!(source.dataset.as_str(), "pems04");
        assert_eq!(source.signal, Path::new("/data/PEMS04/PEMS04.npz"));
        assert_eq!(source.edges, Path::new("/data/PEMS04/PEMS04.csv"));
        let bay = registry.get("pemsbay").unwrap();
        assert_eq!(bay.edges, Path::new("PEMSBAY/distance.csv"));
    }

    #[test]
    fn names_are_case_sensitive() {
        let registry = DatasetRegistry::builtin();
        assert!(registry.resolve("pemsD7M", Path::new(".")).is_ok());
        assert!(matches!(
            registry.resolve("PEMS04", Path::new(".")),
            Err(IoError::UnknownDataset { .. })
        ));
    }

    #[test]
    fn unknown_dataset_lists_known_names() {
        let err = DatasetRegistry::builtin()
            .resolve("metr-la", Path::new("."))
            .unwrap_err();
        match err {
            IoError::UnknownDataset { name, known } => {
                assert_eq!(name, "metr-la");
                assert!(known.contains("pems08"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn json_file_extends_and_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(
            &path,
            r#"{
                "metr-la": {"signal": "METR/metr.npy", "edges": "METR/edges.csv"},
                "pems04": {"signal": "alt/pems04.npz", "edges": "alt/pems04.csv"}
            }"#,
        )
        .unwrap();

        let mut registry = DatasetRegistry::builtin();
        registry.extend_from_json(&path).unwrap();
        assert_eq!(registry.names().count(), 8);
        assert_eq!(registry.get("metr-la").unwrap().signal, Path::new("METR/metr.npy"));
        assert_eq!(registry.get("pems04").unwrap().signal, Path::new("alt/pems04.npz"));
    }

    #[test]
    fn invalid_registry_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"{"../etc": {"signal": "a.npy", "edges": "b.csv"}}"#).unwrap();
        let result = DatasetRegistry::new().extend_from_json(&path);
        assert!(matches!(result, Err(IoError::Graph(_))));
    }

    #[test]
    fn malformed_registry_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            DatasetRegistry::new().extend_from_json(&path),
            Err(IoError::RegistryParse { .. })
        ));
        assert!(matches!(
            DatasetRegistry::new().extend_from_json(&dir.path().join("missing.json")),
            Err(IoError::RegistryRead { .. })
        ));
    }
}
