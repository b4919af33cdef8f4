//! Error types for windowing, splitting, and batching.

/// Errors from window slicing, split construction, and batching.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// Returned when a history or prediction length is zero.
    #[error("{name} must be at least 1, got {value}")]
    InvalidWindowLength {
        /// Which length was rejected.
        name: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// Returned when a series has no valid window anchor.
    #[error("series of {steps} steps has no complete window, need at least {min_steps}")]
    TooShortForWindows {
        /// Length of the series.
        steps: usize,
        /// Minimum length yielding one window.
        min_steps: usize,
    },

    /// Returned when a split range does not fit inside the signal.
    #[error("split range {start}..{end} is invalid for a signal of {steps} steps")]
    InvalidSplitRange {
        /// Start of the range.
        start: usize,
        /// End of the range (exclusive).
        end: usize,
        /// Length of the signal.
        steps: usize,
    },

    /// Returned when a split is shorter than one history plus one prediction window.
    #[error("split {start}..{end} is too short for history {history_len} plus prediction {predict_len}")]
    SplitTooShort {
        /// Start of the range.
        start: usize,
        /// End of the range (exclusive).
        end: usize,
        /// Configured history length.
        history_len: usize,
        /// Configured prediction length.
        predict_len: usize,
    },

    /// Returned when a split ratio is outside `[0, 1]` or not finite.
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRatio {
        /// Which ratio was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when the train and validation ratios sum past 1.
    #[error("train_ratio {train} + valid_ratio {valid} exceeds 1")]
    RatiosExceedOne {
        /// Train ratio.
        train: f64,
        /// Validation ratio.
        valid: f64,
    },

    /// Returned when a channel index does not exist in the signal.
    #[error("channel {channel} does not exist, signal has {channels} channels")]
    ChannelOutOfRange {
        /// Requested channel.
        channel: usize,
        /// Channels present in the signal.
        channels: usize,
    },

    /// Returned when a sample index is past the end of a split.
    #[error("index {index} out of bounds for split of length {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Length of the split.
        len: usize,
    },

    /// Returned when the batch size is zero.
    #[error("batch_size must be at least 1")]
    InvalidBatchSize,

    /// Returned when collating an empty index list.
    #[error("cannot collate an empty batch")]
    EmptyBatch,
}
