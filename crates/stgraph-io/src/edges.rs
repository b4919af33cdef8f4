//! Sensor distance edge list reader.

use std::path::{Path, PathBuf};

use stgraph_graph::Edge;
use tracing::{info, instrument};

use crate::IoError;

/// Reads a `from,to,distance` edge list from CSV.
///
/// The first line is a header and is discarded whatever it contains. Node
/// indices are non-negative integers; columns after the third are ignored.
/// Node range and distance finiteness are checked by the graph builder,
/// which knows the node count.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::MissingRawFile`] | File doesn't exist |
/// | [`IoError::FileOpen`] | File exists but cannot be opened |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::InvalidEdgeRow`] | Row has fewer than 3 columns or unparseable fields |
pub struct EdgeReader {
    path: PathBuf,
}

impl EdgeReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read every edge in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<Edge>, IoError> {
        if !self.path.exists() {
            return Err(IoError::MissingRawFile {
                path: self.path.clone(),
            });
        }
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileOpen {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut edges = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;
            let invalid = |reason| IoError::InvalidEdgeRow {
                path: self.path.clone(),
                row_index,
                reason,
                raw: record.iter().collect::<Vec<_>>().join(","),
            };

            let (Some(from), Some(to), Some(distance)) = (record.get(0), record.get(1), record.get(2)) else {
                return Err(invalid("expected from,to,distance"));
            };
            let from: usize = from.parse().map_err(|_| invalid("from is not a node index"))?;
            let to: usize = to.parse().map_err(|_| invalid("to is not a node index"))?;
            let distance: f64 = distance.parse().map_err(|_| invalid("distance is not a number"))?;
            edges.push(Edge::new(from, to, distance));
        }

        info!(edges = edges.len(), "edge list loaded");
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("distance.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn header_is_discarded_and_rows_parsed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "from,to,cost\n0,1,393.0\n1, 2 ,1010.5\n");
        let edges = EdgeReader::new(&path).read().unwrap();
        assert_eq!(edges, vec![Edge::new(0, 1, 393.0), Edge::new(1, 2, 1010.5)]);
    }

    #[test]
    fn any_first_line_is_a_header() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "3,4,5\n0,1,2\n");
        let edges = EdgeReader::new(&path).read().unwrap();
        assert_eq!(edges, vec![Edge::new(0, 1, 2.0)]);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "from,to,distance,road\n5,7,12.5,I-80\n");
        let edges = EdgeReader::new(&path).read().unwrap();
        assert_eq!(edges, vec![Edge::new(5, 7, 12.5)]);
    }

    #[test]
    fn short_row_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "from,to,distance\n0,1,4.0\n2,3\n");
        assert!(matches!(
            EdgeReader::new(&path).read(),
            Err(IoError::InvalidEdgeRow { row_index: 1, .. })
        ));
    }

    #[test]
    fn negative_node_index_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "from,to,distance\n-1,1,4.0\n");
        match EdgeReader::new(&path).read() {
            Err(IoError::InvalidEdgeRow { reason, raw, .. }) => {
                assert_eq!(reason, "from is not a node index");
                assert_eq!(raw, "-1,1,4.0");
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            EdgeReader::new(&dir.path().join("nope.csv")).read(),
            Err(IoError::MissingRawFile { .. })
        ));
    }
}
