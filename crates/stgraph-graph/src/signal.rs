//! Per-channel statistics and normalization of the raw signal.

use ndarray::{Array3, ArrayView3, Axis};
use serde::Serialize;

/// Population mean and standard deviation of one feature channel over
/// `(time, node)` jointly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelStats {
    /// Mean over every time step and node.
    pub mean: f64,
    /// Population standard deviation over every time step and node.
    pub std: f64,
}

impl ChannelStats {
    /// Divisor used for normalization. A constant channel is only centered.
    #[must_use]
    pub fn scale(&self) -> f64 {
        if self.std > 0.0 { self.std } else { 1.0 }
    }
}

/// Compute [`ChannelStats`] for every channel of a `[time, node, channel]` signal.
///
/// Returns an entry per channel; channels of an empty signal report NaN.
#[must_use]
pub fn channel_statistics(signal: ArrayView3<'_, f64>) -> Vec<ChannelStats> {
    signal
        .axis_iter(Axis(2))
        .map(|lane| ChannelStats {
            mean: lane.mean().unwrap_or(f64::NAN),
            std: lane.std(0.0),
        })
        .collect()
}

/// Return a copy of `signal` with every channel mapped to `(x - mean) / std`.
///
/// # Panics
///
/// Panics if `stats` has fewer entries than the signal has channels.
#[must_use]
pub fn normalize_channels(signal: ArrayView3<'_, f64>, stats: &[ChannelStats]) -> Array3<f64> {
    assert!(
        stats.len() >= signal.len_of(Axis(2)),
        "need statistics for {} channels, got {}",
        signal.len_of(Axis(2)),
        stats.len()
    );
    let mut normalized = signal.to_owned();
    for (mut lane, s) in normalized.axis_iter_mut(Axis(2)).zip(stats) {
        let (mean, scale) = (s.mean, s.scale());
        lane.mapv_inplace(|v| (v - mean) / scale);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::*;

    fn sample_signal() -> Array3<f64> {
        // 2 steps, 2 nodes, 2 channels; channel 1 is constant
        Array3::from_shape_vec((2, 2, 2), vec![1.0, 7.0, 2.0, 7.0, 3.0, 7.0, 4.0, 7.0]).unwrap()
    }

    #[test]
    fn stats_are_joint_over_time_and_node() {
        let stats = channel_statistics(sample_signal().view());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].mean, 2.5);
        assert!((stats[0].std - 1.25_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats[1], ChannelStats { mean: 7.0, std: 0.0 });
    }

    #[test]
    fn normalized_channels_have_zero_mean_unit_std() {
        let signal = sample_signal();
        let stats = channel_statistics(signal.view());
        let normalized = normalize_channels(signal.view(), &stats);
        let after = channel_statistics(normalized.view());
        assert!(after[0].mean.abs() < 1e-12);
        assert!((after[0].std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_channel_is_centered_not_nan() {
        let signal = sample_signal();
        let stats = channel_statistics(signal.view());
        let normalized = normalize_channels(signal.view(), &stats);
        assert!(normalized.index_axis(Axis(2), 1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn input_is_left_untouched() {
        let signal = sample_signal();
        let before = signal.clone();
        let stats = channel_statistics(signal.view());
        let _ = normalize_channels(signal.view(), &stats);
        assert_eq!(signal, before);
    }
}
