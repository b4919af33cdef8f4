//! Index batching and sample collation.

use ndarray::{Array3, Array4, Axis};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::dataset::SplitDataset;
use crate::error::WindowError;

/// Dense batch tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// `[batch, node, history_len, channel]`.
    pub x: Array4<f64>,
    /// `[batch, node, predict_len]`.
    pub y: Array3<f64>,
}

impl Batch {
    /// Number of samples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len_of(Axis(0))
    }

    /// `true` if the batch holds no sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups dataset indices into fixed-size batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    batch_size: usize,
    shuffle_seed: Option<u64>,
    drop_last: bool,
}

impl Batcher {
    /// Create a sequential batcher that keeps the trailing partial batch.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(batch_size: usize) -> Result<Self, WindowError> {
        if batch_size == 0 {
            return Err(WindowError::InvalidBatchSize);
        }
        Ok(Self {
            batch_size,
            shuffle_seed: None,
            drop_last: false,
        })
    }

    /// Shuffle indices with a ChaCha8 generator seeded by `seed`.
    #[must_use]
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Drop the trailing batch when it is smaller than `batch_size`.
    #[must_use]
    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// Return the batch size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches [`batches`](Self::batches) yields for `len` samples.
    #[must_use]
    pub fn num_batches(&self, len: usize) -> usize {
        if self.drop_last {
            len / self.batch_size
        } else {
            len.div_ceil(self.batch_size)
        }
    }

    /// Partition `0..len` into index batches.
    #[must_use]
    pub fn batches(&self, len: usize) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..len).collect();
        if let Some(seed) = self.shuffle_seed {
            indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        }
        indices
            .chunks(self.batch_size)
            .take(self.num_batches(len))
            .map(<[usize]>::to_vec)
            .collect()
    }

    /// Stack the samples at `indices` into one [`Batch`].
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::EmptyBatch`] for no indices and propagates
    /// [`WindowError::IndexOutOfBounds`] from the dataset.
    pub fn collate(dataset: &SplitDataset<'_>, indices: &[usize]) -> Result<Batch, WindowError> {
        if indices.is_empty() {
            return Err(WindowError::EmptyBatch);
        }
        let (nodes, channels) = (dataset.n_nodes(), dataset.n_channels());
        let mut x = Array4::zeros((indices.len(), nodes, dataset.history_len(), channels));
        let mut y = Array3::zeros((indices.len(), nodes, dataset.predict_len()));
        for (slot, &index) in indices.iter().enumerate() {
            let sample = dataset.get(index)?;
            x.index_axis_mut(Axis(0), slot).assign(&sample.x);
            y.index_axis_mut(Axis(0), slot).assign(&sample.y);
        }
        Ok(Batch { x, y })
    }
}
