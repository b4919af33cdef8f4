//! Train/validation/test split generation with per-split statistics.

use std::ops::Range;

use ndarray::{ArrayView3, Axis, s};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::dataset::SplitDataset;
use crate::error::WindowError;
use crate::window::{WindowConfig, WindowStats};

/// How the validation range is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Validation follows train: `[floor(T * tr), floor(T * (tr + vr)))`.
    #[default]
    Standard,
    /// Validation is the tail after train and the validation band, the same
    /// range as test.
    Effective,
}

/// Channel the split statistics are computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsChannel {
    /// Channel 0.
    First,
    /// The last channel.
    #[default]
    Last,
    /// An explicit channel index.
    Index(usize),
}

impl StatsChannel {
    /// Resolve to a concrete index for a signal with `channels` channels.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ChannelOutOfRange`] if the channel does not exist.
    pub fn resolve(self, channels: usize) -> Result<usize, WindowError> {
        let channel = match self {
            Self::First => 0,
            Self::Last => channels.saturating_sub(1),
            Self::Index(index) => index,
        };
        if channel >= channels {
            return Err(WindowError::ChannelOutOfRange { channel, channels });
        }
        Ok(channel)
    }
}

/// Split ratios, sample geometry, and statistics source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    train_ratio: f64,
    valid_ratio: f64,
    history_len: usize,
    predict_len: usize,
    policy: SplitPolicy,
    stats_channel: StatsChannel,
    stats_window: WindowConfig,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.6,
            valid_ratio: 0.2,
            history_len: 12,
            predict_len: 12,
            policy: SplitPolicy::Standard,
            stats_channel: StatsChannel::Last,
            stats_window: WindowConfig::default(),
        }
    }
}

impl SplitConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the train and validation ratios.
    #[must_use]
    pub fn with_ratios(mut self, train_ratio: f64, valid_ratio: f64) -> Self {
        self.train_ratio = train_ratio;
        self.valid_ratio = valid_ratio;
        self
    }

    /// Set the sample history and prediction lengths.
    #[must_use]
    pub fn with_lengths(mut self, history_len: usize, predict_len: usize) -> Self {
        self.history_len = history_len;
        self.predict_len = predict_len;
        self
    }

    /// Set the validation placement.
    #[must_use]
    pub fn with_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the statistics channel.
    #[must_use]
    pub fn with_stats_channel(mut self, channel: StatsChannel) -> Self {
        self.stats_channel = channel;
        self
    }

    /// Set the window geometry used for split statistics.
    #[must_use]
    pub fn with_stats_window(mut self, window: WindowConfig) -> Self {
        self.stats_window = window;
        self
    }

    /// Return the train ratio.
    #[must_use]
    pub fn train_ratio(&self) -> f64 {
        self.train_ratio
    }

    /// Return the validation ratio.
    #[must_use]
    pub fn valid_ratio(&self) -> f64 {
        self.valid_ratio
    }

    /// Return the sample history length.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Return the sample prediction length.
    #[must_use]
    pub fn predict_len(&self) -> usize {
        self.predict_len
    }

    /// Return the validation placement.
    #[must_use]
    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Return the statistics channel.
    #[must_use]
    pub fn stats_channel(&self) -> StatsChannel {
        self.stats_channel
    }

    /// Return the statistics window geometry.
    #[must_use]
    pub fn stats_window(&self) -> WindowConfig {
        self.stats_window
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WindowError::InvalidRatio`] | A ratio is not finite or outside `[0, 1]` |
    /// | [`WindowError::RatiosExceedOne`] | `train_ratio + valid_ratio > 1` |
    /// | [`WindowError::InvalidWindowLength`] | A sample length is zero |
    pub fn validate(&self) -> Result<(), WindowError> {
        for (name, value) in [("train_ratio", self.train_ratio), ("valid_ratio", self.valid_ratio)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WindowError::InvalidRatio { name, value });
            }
        }
        if self.train_ratio + self.valid_ratio > 1.0 {
            return Err(WindowError::RatiosExceedOne {
                train: self.train_ratio,
                valid: self.valid_ratio,
            });
        }
        WindowConfig::new(self.history_len, self.predict_len)?;
        Ok(())
    }

    /// Split boundaries for a signal of `steps` time steps.
    #[must_use]
    pub fn bounds(&self, steps: usize) -> SplitBounds {
        let cut = |ratio: f64| ((steps as f64 * ratio).floor() as usize).min(steps);
        let train_end = cut(self.train_ratio);
        let valid_end = cut(self.train_ratio + self.valid_ratio).max(train_end);
        let test = valid_end..steps;
        let valid = match self.policy {
            SplitPolicy::Standard => train_end..valid_end,
            SplitPolicy::Effective => test.clone(),
        };
        SplitBounds {
            train: 0..train_end,
            valid,
            test,
        }
    }
}

/// Time ranges of the three splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitBounds {
    /// Train range.
    pub train: Range<usize>,
    /// Validation range.
    pub valid: Range<usize>,
    /// Test range.
    pub test: Range<usize>,
}

/// Normalization statistics of the three splits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitStatistics {
    /// Train statistics.
    pub train: WindowStats,
    /// Validation statistics.
    pub valid: WindowStats,
    /// Test statistics.
    pub test: WindowStats,
}

/// The three split datasets over one borrowed signal.
#[derive(Debug, Clone)]
pub struct Splits<'a> {
    /// Train samples.
    pub train: SplitDataset<'a>,
    /// Validation samples.
    pub valid: SplitDataset<'a>,
    /// Test samples.
    pub test: SplitDataset<'a>,
}

impl Splits<'_> {
    /// Statistics of each split.
    #[must_use]
    pub fn statistics(&self) -> SplitStatistics {
        SplitStatistics {
            train: self.train.stats(),
            valid: self.valid.stats(),
            test: self.test.stats(),
        }
    }

    /// Time range of each split.
    #[must_use]
    pub fn bounds(&self) -> SplitBounds {
        SplitBounds {
            train: self.train.range(),
            valid: self.valid.range(),
            test: self.test.range(),
        }
    }
}

/// Cut `signal` (`[time, node, channel]`) into train, validation, and test datasets.
///
/// Each split is normalized with statistics of its own range only, computed
/// over the configured statistics channel with the statistics window.
///
/// # Errors
///
/// Propagates [`SplitConfig::validate`] errors, returns
/// [`WindowError::ChannelOutOfRange`] for a missing statistics channel,
/// [`WindowError::TooShortForWindows`] when a split cannot hold a statistics
/// window, and [`WindowError::SplitTooShort`] when it cannot hold a sample.
#[instrument(skip_all, fields(shape = ?signal.shape(), policy = ?config.policy()))]
pub fn generate_splits<'a>(signal: ArrayView3<'a, f64>, config: &SplitConfig) -> Result<Splits<'a>, WindowError> {
    config.validate()?;
    let (steps, _, channels) = signal.dim();
    let channel = config.stats_channel.resolve(channels)?;
    let stats_series = signal.index_axis(Axis(2), channel);
    let bounds = config.bounds(steps);

    let dataset = |range: Range<usize>| -> Result<SplitDataset<'a>, WindowError> {
        let stats = config
            .stats_window
            .compute_window_statistics(stats_series.slice(s![range.clone(), ..]))?;
        SplitDataset::new(signal, range, config.history_len, config.predict_len, stats)
    };

    let splits = Splits {
        train: dataset(bounds.train)?,
        valid: dataset(bounds.valid)?,
        test: dataset(bounds.test)?,
    };

    let stats = splits.statistics();
    info!(
        train_len = splits.train.len(),
        valid_len = splits.valid.len(),
        test_len = splits.test.len(),
        train_mean = stats.train.mean,
        train_std = stats.train.std,
        valid_mean = stats.valid.mean,
        valid_std = stats.valid.std,
        test_mean = stats.test.mean,
        test_std = stats.test.std,
        "splits generated"
    );
    Ok(splits)
}
