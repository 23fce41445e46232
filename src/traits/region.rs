//! Spatial region trait consumed by the order selector.
use num::Float;

/// An axis-aligned spatial extent.
///
/// Only the per-axis width and the dimensionality are required; the order
/// selector uses the widest axis to bound the convergence ratio of a
/// truncated expansion over the region.
pub trait Region {
    /// Scalar type of the extents.
    type Scalar: Float;

    /// Number of spatial dimensions.
    fn dim(&self) -> usize;

    /// Extent of the region along `axis`.
    fn width(&self, axis: usize) -> Self::Scalar;
}
