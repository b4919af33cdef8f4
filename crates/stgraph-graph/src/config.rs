//! Graph construction configuration.

use crate::error::GraphError;

/// Configuration for [`GraphBuilder`](crate::GraphBuilder).
///
/// # Defaults
///
/// | Parameter         | Default |
/// |-------------------|---------|
/// | `sigma_semantic`  | 0.1     |
/// | `sigma_spatial`   | 10.0    |
/// | `thresh_semantic` | 0.6     |
/// | `thresh_spatial`  | 0.5     |
/// | `day_steps`       | 288 (5-minute sampling over 24 hours) |
/// | `dtw_radius`      | 6       |
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    pub(crate) sigma_semantic: f64,
    pub(crate) sigma_spatial: f64,
    pub(crate) thresh_semantic: f64,
    pub(crate) thresh_spatial: f64,
    pub(crate) day_steps: usize,
    pub(crate) dtw_radius: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            sigma_semantic: 0.1,
            sigma_spatial: 10.0,
            thresh_semantic: 0.6,
            thresh_spatial: 0.5,
            day_steps: 288,
            dtw_radius: 6,
        }
    }
}

impl GraphConfig {
    /// Create a configuration with the defaults listed above.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Gaussian kernel width for the semantic graph.
    #[must_use]
    pub fn with_sigma_semantic(mut self, sigma: f64) -> Self {
        self.sigma_semantic = sigma;
        self
    }

    /// Set the Gaussian kernel width for the spatial graph.
    #[must_use]
    pub fn with_sigma_spatial(mut self, sigma: f64) -> Self {
        self.sigma_spatial = sigma;
        self
    }

    /// Set the binarization threshold for the semantic graph.
    #[must_use]
    pub fn with_thresh_semantic(mut self, thresh: f64) -> Self {
        self.thresh_semantic = thresh;
        self
    }

    /// Set the sparsification threshold for the spatial graph.
    #[must_use]
    pub fn with_thresh_spatial(mut self, thresh: f64) -> Self {
        self.thresh_spatial = thresh;
        self
    }

    /// Set the number of time steps in one daily block.
    #[must_use]
    pub fn with_day_steps(mut self, day_steps: usize) -> Self {
        self.day_steps = day_steps;
        self
    }

    /// Set the DTW search radius.
    #[must_use]
    pub fn with_dtw_radius(mut self, radius: usize) -> Self {
        self.dtw_radius = radius;
        self
    }

    /// Return the semantic kernel width.
    #[must_use]
    pub fn sigma_semantic(&self) -> f64 {
        self.sigma_semantic
    }

    /// Return the spatial kernel width.
    #[must_use]
    pub fn sigma_spatial(&self) -> f64 {
        self.sigma_spatial
    }

    /// Return the semantic threshold.
    #[must_use]
    pub fn thresh_semantic(&self) -> f64 {
        self.thresh_semantic
    }

    /// Return the spatial threshold.
    #[must_use]
    pub fn thresh_spatial(&self) -> f64 {
        self.thresh_spatial
    }

    /// Return the daily block size.
    #[must_use]
    pub fn day_steps(&self) -> usize {
        self.day_steps
    }

    /// Return the DTW search radius.
    #[must_use]
    pub fn dtw_radius(&self) -> usize {
        self.dtw_radius
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`GraphError::InvalidSigma`] | A kernel width is not finite and positive |
    /// | [`GraphError::InvalidThreshold`] | A threshold is not finite |
    /// | [`GraphError::InvalidDaySteps`] | `day_steps` is zero |
    pub fn validate(&self) -> Result<(), GraphError> {
        for (name, value) in [
            ("sigma_semantic", self.sigma_semantic),
            ("sigma_spatial", self.sigma_spatial),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GraphError::InvalidSigma { name, value });
            }
        }
        for (name, value) in [
            ("thresh_semantic", self.thresh_semantic),
            ("thresh_spatial", self.thresh_spatial),
        ] {
            if !value.is_finite() {
                return Err(GraphError::InvalidThreshold { name, value });
            }
        }
        if self.day_steps == 0 {
            return Err(GraphError::InvalidDaySteps { day_steps: 0 });
        }
        Ok(())
    }
}
