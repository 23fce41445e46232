//! Expansion container types.
use std::sync::Arc;

use num::Float;

use crate::expansion::table::MultiIndexTable;
use crate::traits::expansion::Expansion;
use crate::traits::kernel::ExpansionKernel;

/// Outgoing (multipole-like) series expansion representing the aggregate
/// effect of a cluster of weighted source points, anchored at a center.
///
/// Coefficients are weighted monomial moments of the sources about the
/// center; evaluation far from the center goes through the kernel's
/// directional derivatives.
pub struct FarFieldExpansion<T, K>
where
    T: Float,
    K: ExpansionKernel<T>,
{
    pub(crate) kernel: K,
    pub(crate) derivative: K::Derivative,
    pub(crate) center: Vec<T>,
    pub(crate) coeffs: Vec<T>,
    pub(crate) order: usize,
    pub(crate) table: Arc<MultiIndexTable<T>>,
}

/// Incoming (Taylor-like) series expansion representing the field
/// contributed by distant sources, anchored at a center and cheap to
/// evaluate at nearby query points.
pub struct LocalExpansion<T, K>
where
    T: Float,
    K: ExpansionKernel<T>,
{
    pub(crate) kernel: K,
    pub(crate) derivative: K::Derivative,
    pub(crate) center: Vec<T>,
    pub(crate) coeffs: Vec<T>,
    pub(crate) order: usize,
    pub(crate) table: Arc<MultiIndexTable<T>>,
}

impl<T, K> Expansion for FarFieldExpansion<T, K>
where
    T: Float,
    K: ExpansionKernel<T>,
{
    type Scalar = T;

    fn center(&self) -> &[T] {
        &self.center
    }

    fn coeffs(&self) -> &[T] {
        &self.coeffs
    }

    fn order(&self) -> usize {
        self.order
    }

    fn bandwidth_sq(&self) -> T {
        self.kernel.bandwidth_sq()
    }

    fn table(&self) -> &MultiIndexTable<T> {
        &self.table
    }
}

impl<T, K> Expansion for LocalExpansion<T, K>
where
    T: Float,
    K: ExpansionKernel<T>,
{
    type Scalar = T;

    fn center(&self) -> &[T] {
        &self.center
    }

    fn coeffs(&self) -> &[T] {
        &self.coeffs
    }

    fn order(&self) -> usize {
        self.order
    }

    fn bandwidth_sq(&self) -> T {
        self.kernel.bandwidth_sq()
    }

    fn table(&self) -> &MultiIndexTable<T> {
        &self.table
    }
}
