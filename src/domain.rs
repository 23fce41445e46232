//! Axis-aligned bounding regions.
use itertools::Itertools;
use num::Float;

use crate::traits::region::Region;
use crate::traits::types::ExpansionError;

/// An axis-aligned box described by an origin and a side length per axis.
#[derive(Debug, Clone)]
pub struct Domain<T> {
    origin: Vec<T>,
    side_length: Vec<T>,
}

impl<T> Domain<T>
where
    T: Float,
{
    /// Construct a domain from an origin and per-axis side lengths.
    ///
    /// # Arguments
    /// * `origin` - Minimum corner of the box.
    /// * `side_length` - Extent along each axis.
    pub fn new(origin: &[T], side_length: &[T]) -> Result<Self, ExpansionError> {
        if origin.len() != side_length.len() || origin.is_empty() {
            return Err(ExpansionError::DimensionMismatch(format!(
                "origin has {} entries, side lengths have {}",
                origin.len(),
                side_length.len()
            )));
        }
        Ok(Self {
            origin: origin.to_vec(),
            side_length: side_length.to_vec(),
        })
    }

    /// Compute the domain spanned by a set of points, enlarged by a small
    /// fraction along each axis so that no point lies on the boundary.
    ///
    /// # Arguments
    /// * `coordinates` - Point-major coordinate slice.
    /// * `dim` - Number of spatial dimensions.
    pub fn from_points(coordinates: &[T], dim: usize) -> Result<Self, ExpansionError> {
        if dim == 0 || coordinates.len() % dim != 0 || coordinates.is_empty() {
            return Err(ExpansionError::DimensionMismatch(format!(
                "coordinate slice of length {} is not a multiple of dimension {}",
                coordinates.len(),
                dim
            )));
        }
        let err_fraction = T::from(0.005).unwrap();
        let two = T::from(2.0).unwrap();

        let mut origin = Vec::with_capacity(dim);
        let mut side_length = Vec::with_capacity(dim);
        for d in 0..dim {
            let axis = coordinates.iter().skip(d).step_by(dim).cloned().collect_vec();
            let min = axis
                .iter()
                .cloned()
                .fold(T::infinity(), |acc, x| acc.min(x));
            let max = axis
                .iter()
                .cloned()
                .fold(T::neg_infinity(), |acc, x| acc.max(x));
            let err = (max - min) * err_fraction;
            origin.push(min - err);
            side_length.push(max - min + two * err);
        }
        Ok(Self {
            origin,
            side_length,
        })
    }

    /// Minimum corner of the box.
    pub fn origin(&self) -> &[T] {
        &self.origin
    }

    /// Per-axis extents of the box.
    pub fn side_length(&self) -> &[T] {
        &self.side_length
    }
}

impl<T> Region for Domain<T>
where
    T: Float,
{
    type Scalar = T;

    fn dim(&self) -> usize {
        self.origin.len()
    }

    fn width(&self, axis: usize) -> T {
        self.side_length[axis]
    }
}
