//! Expansion traits.
use num::Float;

use crate::expansion::table::MultiIndexTable;

/// Read-only surface shared by far-field and local expansions.
///
/// Translation operators only ever read a peer expansion's center,
/// coefficients and order through this interface; the borrowed slices are
/// valid for the duration of the call and must not be stored.
pub trait Expansion {
    /// Scalar type of centers and coefficients.
    type Scalar: Float;

    /// Center of the expansion.
    fn center(&self) -> &[Self::Scalar];

    /// Coefficients up to the current order. Entries beyond
    /// `total_num_coeffs(order)` are storage only and carry no meaning.
    fn coeffs(&self) -> &[Self::Scalar];

    /// Current truncation order, monotone non-decreasing over the object's
    /// lifetime.
    fn order(&self) -> usize;

    /// Squared bandwidth of the kernel bound at construction.
    fn bandwidth_sq(&self) -> Self::Scalar;

    /// The shared multi-index table this expansion is bound to.
    fn table(&self) -> &MultiIndexTable<Self::Scalar>;
}
