//! Series expansion implementations.
//!
//! Far-field expansions summarize source clusters bottom-up; far-to-local
//! translation converts them into local expansions at target centers;
//! local-to-local translation shifts those down a target hierarchy; query
//! points evaluate the final local expansion. The order selector gates the
//! pipeline by reporting whether an expansion-based approximation is
//! admissible for a given region and tolerance.
use num::Float;

use crate::traits::types::ExpansionError;

pub mod farfield;
pub mod local;
pub mod table;
pub mod types;

/// Validate a `[begin, end)` point range against a point-major coordinate
/// slice and its parallel weight vector.
pub(crate) fn check_point_range<T>(
    dim: usize,
    coordinates: &[T],
    weights: &[T],
    begin: usize,
    end: usize,
) -> Result<(), ExpansionError>
where
    T: Float,
{
    if coordinates.len() % dim != 0 {
        return Err(ExpansionError::DimensionMismatch(format!(
            "coordinate slice of length {} is not a multiple of dimension {}",
            coordinates.len(),
            dim
        )));
    }
    let n_points = coordinates.len() / dim;
    if begin > end || end > n_points || end > weights.len() {
        return Err(ExpansionError::DimensionMismatch(format!(
            "point range [{begin}, {end}) out of bounds for {n_points} points, {} weights",
            weights.len()
        )));
    }
    Ok(())
}
