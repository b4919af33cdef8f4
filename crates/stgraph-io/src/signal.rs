//! NumPy raw signal reader.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayD, Axis, Ix3};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpyExt, ReadNpzError};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Array name holding the signal inside an `.npz` archive.
const NPZ_ARRAY: &str = "data";

/// Reads a `[time, node, channel]` signal from `.npz` or `.npy`.
///
/// `.npz` archives must contain an array named `data`; any other extension is
/// read as a bare `.npy`. Elements may be `f64` or `f32`. A 2D `[time, node]`
/// array gains a single channel axis.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::MissingRawFile`] | File doesn't exist |
/// | [`IoError::FileOpen`] | File exists but cannot be opened |
/// | [`IoError::NpzRead`] / [`IoError::NpyRead`] | Malformed file or unsupported dtype |
/// | [`IoError::MissingNpzArray`] | Archive has no `data` array |
/// | [`IoError::UnsupportedShape`] | Array does not have 2 or 3 axes |
/// | [`IoError::NonFiniteSignal`] | Array holds NaN or infinite values |
pub struct SignalReader {
    path: PathBuf,
}

impl SignalReader {
    /// Create a new reader for the given signal file.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the signal.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Array3<f64>, IoError> {
        if !self.path.exists() {
            return Err(IoError::MissingRawFile {
                path: self.path.clone(),
            });
        }
        let is_npz = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("npz"));
        let raw = if is_npz { self.read_npz()? } else { self.read_npy()? };

        let signal = self.promote(raw)?;
        if let Some(((time, node, channel), _)) = signal.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(IoError::NonFiniteSignal {
                path: self.path.clone(),
                time,
                node,
                channel,
            });
        }
        info!(shape = ?signal.shape(), "signal loaded");
        Ok(signal)
    }

    fn open(&self) -> Result<BufReader<File>, IoError> {
        File::open(&self.path)
            .map(BufReader::new)
            .map_err(|e| IoError::FileOpen {
                path: self.path.clone(),
                source: e,
            })
    }

    fn read_npy(&self) -> Result<ArrayD<f64>, IoError> {
        let npy_error = |source| IoError::NpyRead {
            path: self.path.clone(),
            source,
        };
        match ArrayD::<f64>::read_npy(self.open()?) {
            Err(ReadNpyError::WrongDescriptor(_)) => {
                debug!("not f64, retrying as f32");
                let narrow = ArrayD::<f32>::read_npy(self.open()?).map_err(npy_error)?;
                Ok(narrow.mapv(f64::from))
            }
            other => other.map_err(npy_error),
        }
    }

    fn read_npz(&self) -> Result<ArrayD<f64>, IoError> {
        let npz_error = |source| IoError::NpzRead {
            path: self.path.clone(),
            source,
        };
        let mut npz = NpzReader::new(self.open()?).map_err(npz_error)?;
        let names = npz.names().map_err(npz_error)?;
        let Some(name) = names
            .iter()
            .find(|n| n.as_str() == NPZ_ARRAY || n.strip_suffix(".npy") == Some(NPZ_ARRAY))
            .cloned()
        else {
            return Err(IoError::MissingNpzArray {
                path: self.path.clone(),
                name: NPZ_ARRAY,
                available: names,
            });
        };

        match npz.by_name::<_, ndarray::IxDyn>(&name) {
            Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => {
                debug!("not f64, retrying as f32");
                let narrow: ArrayD<f32> = npz.by_name(&name).map_err(npz_error)?;
                Ok(narrow.mapv(f64::from))
            }
            other => other.map_err(npz_error),
        }
    }

    fn promote(&self, raw: ArrayD<f64>) -> Result<Array3<f64>, IoError> {
        let unsupported = |shape: &[usize]| IoError::UnsupportedShape {
            path: self.path.clone(),
            shape: shape.to_vec(),
        };
        let raw = match raw.ndim() {
            2 => raw.insert_axis(Axis(2)),
            3 => raw,
            _ => return Err(unsupported(raw.shape())),
        };
        let shape = raw.shape().to_vec();
        raw.into_dimensionality::<Ix3>().map_err(|_| unsupported(&shape))
    }
}
