//! Dataset identity and raw edge types.

use std::borrow::Borrow;
use std::fmt;

use crate::error::GraphError;

/// Identity of a sensor dataset. Keys every cached derived matrix.
///
/// Must match `[a-zA-Z0-9_-]+`, since it becomes part of cache file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(String);

impl DatasetId {
    /// Parse and validate a dataset id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidDatasetId`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, GraphError> {
        let name = name.into();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(GraphError::InvalidDatasetId { name });
        }
        Ok(Self(name))
    }

    /// Return the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DatasetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An undirected road-distance edge between two sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Start node index.
    pub from: usize,
    /// End node index.
    pub to: usize,
    /// Physical distance between the two sensors.
    pub distance: f64,
}

impl Edge {
    /// Create a new edge.
    #[must_use]
    pub fn new(from: usize, to: usize, distance: f64) -> Self {
        Self { from, to, distance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_registry_style_names() {
        for name in ["pems04", "pemsD7M", "my-set_2"] {
            assert_eq!(DatasetId::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn maps_keyed_by_id_look_up_by_name() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(DatasetId::new("pems08").unwrap(), 8);
        map.insert(DatasetId::new("pems04").unwrap(), 4);
        assert_eq!(map.get("pems04"), Some(&4));
        assert_eq!(map.get("pems03"), None);
    }

    #[test]
    fn rejects_path_like_names() {
        for name in ["", "../pems04", "pems 04", "a/b"] {
            assert!(matches!(
                DatasetId::new(name),
                Err(GraphError::InvalidDatasetId { .. })
            ));
        }
    }
}
