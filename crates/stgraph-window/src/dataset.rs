//! Indexed `(x, y)` view over one split of the raw signal.

use std::ops::Range;

use ndarray::{Array, Array2, Array3, ArrayBase, ArrayView3, Data, Dimension, s};

use crate::error::WindowError;
use crate::window::WindowStats;

/// One model sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Normalized history, `[node, history_len, channel]`.
    pub x: Array3<f64>,
    /// Raw channel-0 targets, `[node, predict_len]`.
    pub y: Array2<f64>,
}

/// Sliding-window samples over `[start, end)` of a borrowed signal.
///
/// Holds no normalized copy: each [`get`](Self::get) slices the raw signal
/// and applies `(x - mean) / std` with the split's scalar statistics.
#[derive(Debug, Clone)]
pub struct SplitDataset<'a> {
    data: ArrayView3<'a, f64>,
    range: Range<usize>,
    history_len: usize,
    predict_len: usize,
    stats: WindowStats,
    len: usize,
}

impl<'a> SplitDataset<'a> {
    /// Bind a split of `signal` (`[time, node, channel]`).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WindowError::InvalidSplitRange`] | `range` is reversed or ends past the signal |
    /// | [`WindowError::InvalidWindowLength`] | `history_len` or `predict_len` is zero |
    /// | [`WindowError::SplitTooShort`] | `range` holds fewer than `history_len + predict_len` steps |
    /// | [`WindowError::ChannelOutOfRange`] | `signal` has no channels |
    pub fn new(
        signal: ArrayView3<'a, f64>,
        range: Range<usize>,
        history_len: usize,
        predict_len: usize,
        stats: WindowStats,
    ) -> Result<Self, WindowError> {
        let (steps, _, channels) = signal.dim();
        if range.start > range.end || range.end > steps {
            return Err(WindowError::InvalidSplitRange {
                start: range.start,
                end: range.end,
                steps,
            });
        }
        if history_len == 0 || predict_len == 0 {
            let (name, value) = if history_len == 0 {
                ("history_len", history_len)
            } else {
                ("predict_len", predict_len)
            };
            return Err(WindowError::InvalidWindowLength { name, value });
        }
        if range.len() < history_len + predict_len {
            return Err(WindowError::SplitTooShort {
                start: range.start,
                end: range.end,
                history_len,
                predict_len,
            });
        }
        if channels == 0 {
            return Err(WindowError::ChannelOutOfRange { channel: 0, channels });
        }

        let len = range.len() - history_len - predict_len + 1;
        Ok(Self {
            data: signal.slice_move(s![range.clone(), .., ..]),
            range,
            history_len,
            predict_len,
            stats,
            len,
        })
    }

    /// Number of samples, `(end - start) - history_len - predict_len + 1`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: construction rejects splits without a sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Time range of the split within the full signal.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Normalization statistics of the split.
    #[must_use]
    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    /// Return the history length.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Return the prediction length.
    #[must_use]
    pub fn predict_len(&self) -> usize {
        self.predict_len
    }

    /// Number of sensor nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.data.len_of(ndarray::Axis(1))
    }

    /// Number of feature channels.
    #[must_use]
    pub fn n_channels(&self) -> usize {
        self.data.len_of(ndarray::Axis(2))
    }

    /// Sample `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::IndexOutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<Sample, WindowError> {
        if index >= self.len {
            return Err(WindowError::IndexOutOfBounds { index, len: self.len });
        }
        Ok(self.sample(index))
    }

    /// Iterate every sample in index order.
    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len).map(|index| self.sample(index))
    }

    /// Apply the split normalization to raw values.
    #[must_use]
    pub fn normalize<S, D>(&self, raw: &ArrayBase<S, D>) -> Array<f64, D>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let WindowStats { mean, std } = self.stats;
        raw.mapv(|v| (v - mean) / std)
    }

    /// Invert the split normalization: `x * std + mean`.
    #[must_use]
    pub fn denormalize<S, D>(&self, normalized: &ArrayBase<S, D>) -> Array<f64, D>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let WindowStats { mean, std } = self.stats;
        normalized.mapv(|v| v * std + mean)
    }

    fn sample(&self, index: usize) -> Sample {
        let history_end = index + self.history_len;
        let history = self
            .data
            .slice(s![index..history_end, .., ..])
            .permuted_axes([1, 0, 2]);
        let targets = self
            .data
            .slice(s![history_end..history_end + self.predict_len, .., 0])
            .reversed_axes();
        Sample {
            x: self.normalize(&history),
            y: targets.to_owned(),
        }
    }
}
