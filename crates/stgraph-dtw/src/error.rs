//! Error types for DTW computation.

/// Errors from DTW alignment and sequence validation.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when an empty slice is provided as a sequence.
    #[error("sequence must be non-empty")]
    EmptySeries,

    /// Returned when a sequence contains NaN, infinity, or negative infinity.
    #[error("sequence contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when the band is too narrow for the end cell to be reachable.
    #[error("band radius {radius} cannot align sequences of length {len_a} and {len_b}")]
    BandTooNarrow {
        /// Sakoe-Chiba radius in use.
        radius: usize,
        /// Length of the first sequence.
        len_a: usize,
        /// Length of the second sequence.
        len_b: usize,
    },
}
