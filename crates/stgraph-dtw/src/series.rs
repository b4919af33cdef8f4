//! Validated borrowed sequence views.

use std::ops::Index;

use crate::error::DtwError;

/// Borrowed, validated view into a sequence. Guaranteed non-empty with all
/// finite values.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a>(&'a [f64]);

impl<'a> SeriesView<'a> {
    /// Create a new view, validating that the slice is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `slice` is empty |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(slice: &'a [f64]) -> Result<Self, DtwError> {
        if slice.is_empty() {
            return Err(DtwError::EmptySeries);
        }
        if let Some(index) = slice.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue { index });
        }
        Ok(Self(slice))
    }

    /// Return the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.0
    }

    /// Return the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed view; provided for the
    /// `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<usize> for SeriesView<'_> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> TryFrom<&'a [f64]> for SeriesView<'a> {
    type Error = DtwError;

    fn try_from(slice: &'a [f64]) -> Result<Self, Self::Error> {
        Self::new(slice)
    }
}
