//! Banded dynamic time warping.
//!
//! Pure math library with zero I/O. Computes the accumulated alignment cost
//! between two sequences, optionally restricted to a Sakoe-Chiba band. This
//! is the alignment capability behind the semantic sensor graph.

mod constraint;
mod cost;
mod dtw;
mod error;
mod series;

pub use constraint::BandConstraint;
pub use cost::LocalCost;
pub use dtw::Dtw;
pub use error::DtwError;
pub use series::SeriesView;
