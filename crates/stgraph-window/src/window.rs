//! Sliding-window slicing and windowed statistics over a `[time, node]` series.

use std::ops::Range;

use ndarray::{Array3, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::WindowError;

/// History and prediction window geometry.
///
/// Input offsets relative to an anchor `t` are `-(history_len - 1) ..= 0`,
/// output offsets `horizon_start ..= horizon_start + predict_len - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    history_len: usize,
    predict_len: usize,
    horizon_start: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            history_len: 12,
            predict_len: 12,
            horizon_start: 1,
        }
    }
}

/// Scalar mean and population standard deviation over stacked windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Mean over every window element.
    pub mean: f64,
    /// Population standard deviation over every window element.
    pub std: f64,
}

impl WindowConfig {
    /// Create a window geometry with `horizon_start = 1`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidWindowLength`] if either length is zero.
    pub fn new(history_len: usize, predict_len: usize) -> Result<Self, WindowError> {
        if history_len == 0 {
            return Err(WindowError::InvalidWindowLength {
                name: "history_len",
                value: history_len,
            });
        }
        if predict_len == 0 {
            return Err(WindowError::InvalidWindowLength {
                name: "predict_len",
                value: predict_len,
            });
        }
        Ok(Self {
            history_len,
            predict_len,
            horizon_start: 1,
        })
    }

    /// Set the first output offset.
    #[must_use]
    pub fn with_horizon_start(mut self, horizon_start: usize) -> Self {
        self.horizon_start = horizon_start;
        self
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

    /// Return the first output offset.
    #[must_use]
    pub fn horizon_start(&self) -> usize {
        self.horizon_start
    }

    /// Largest output offset.
    fn max_output(&self) -> usize {
        self.horizon_start + self.predict_len - 1
    }

    /// Valid anchors `[history_len - 1, steps - max_output)` for a series of `steps`.
    ///
    /// Empty when the series is too short.
    #[must_use]
    pub fn anchors(&self, steps: usize) -> Range<usize> {
        let start = self.history_len - 1;
        let end = steps.saturating_sub(self.max_output()).max(start);
        start..end
    }

    /// Number of valid anchors for a series of `steps`.
    #[must_use]
    pub fn num_windows(&self, steps: usize) -> usize {
        self.anchors(steps).len()
    }

    fn checked_anchors(&self, steps: usize) -> Result<Range<usize>, WindowError> {
        let anchors = self.anchors(steps);
        if anchors.is_empty() {
            return Err(WindowError::TooShortForWindows {
                steps,
                min_steps: self.history_len + self.max_output(),
            });
        }
        Ok(anchors)
    }

    /// Stack every input window of `series` into `[num_windows, history_len, node]`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::TooShortForWindows`] when no anchor is valid.
    pub fn slice_windows(&self, series: ArrayView2<'_, f64>) -> Result<Array3<f64>, WindowError> {
        let anchors = self.checked_anchors(series.nrows())?;
        let mut windows = Array3::zeros((anchors.len(), self.history_len, series.ncols()));
        for (mut window, anchor) in windows.axis_iter_mut(Axis(0)).zip(anchors) {
            window.assign(&series.slice(s![anchor + 1 - self.history_len..=anchor, ..]));
        }
        Ok(windows)
    }

    /// Mean and population std of the stack [`slice_windows`](Self::slice_windows) would return.
    ///
    /// Streams over the series instead of materializing the stack: each time
    /// step is weighted by the number of input windows that contain it.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::TooShortForWindows`] when no anchor is valid.
    #[instrument(skip_all, fields(steps = series.nrows(), nodes = series.ncols()))]
    pub fn compute_window_statistics(&self, series: ArrayView2<'_, f64>) -> Result<WindowStats, WindowError> {
        let anchors = self.checked_anchors(series.nrows())?;
        let weights: Vec<f64> = (0..anchors.end)
            .map(|t| {
                let lo = anchors.start.max(t);
                let hi = (anchors.end - 1).min(t + self.history_len - 1);
                if hi >= lo { (hi - lo + 1) as f64 } else { 0.0 }
            })
            .collect();

        let total = (anchors.len() * self.history_len * series.ncols()) as f64;
        let rows = || series.outer_iter().zip(&weights);
        let mean = rows().map(|(row, &w)| w * row.sum()).sum::<f64>() / total;
        let variance = rows()
            .map(|(row, &w)| w * row.fold(0.0, |acc, &v| acc + (v - mean).powi(2)))
            .sum::<f64>()
            / total;

        let stats = WindowStats {
            mean,
            std: variance.sqrt(),
        };
        debug!(windows = anchors.len(), mean = stats.mean, std = stats.std, "window statistics");
        Ok(stats)
    }
}
