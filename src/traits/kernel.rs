//! Kernel traits.
//!
//! Expansions are parametrized by a kernel family and its matching derivative
//! policy, chosen once at construction. The derivative policy exploits
//! separability across axes: it fills a table of 1-D derivative values per
//! axis ([`DerivativeMap`]) and combines per-axis entries into the mixed
//! partial derivative implied by a multi-index.
use num::Float;

use crate::traits::types::{DerivativeMap, ExpansionError};

/// A symmetric, bandwidth-parametrized kernel usable for series expansion.
pub trait ExpansionKernel<T>: Sized
where
    T: Float,
{
    /// Derivative policy matching this kernel family.
    type Derivative: KernelDerivative<T> + Default;

    /// Construct from a bandwidth.
    ///
    /// # Arguments
    /// * `bandwidth` - The kernel bandwidth, must be strictly positive.
    fn new(bandwidth: T) -> Result<Self, ExpansionError>;

    /// The squared bandwidth this kernel was constructed with.
    fn bandwidth_sq(&self) -> T;

    /// Evaluate the kernel for a displacement between two points. Used by
    /// direct-summation reference paths, not by the expansion machinery.
    ///
    /// # Arguments
    /// * `displacement` - Componentwise difference between two points.
    fn evaluate(&self, displacement: &[T]) -> T;
}

/// Kernel-specific computation of the derivative values that form expansion
/// coefficients.
pub trait KernelDerivative<T>
where
    T: Float,
{
    /// The factor by which raw coordinate offsets are normalized before any
    /// derivative or monomial is formed, e.g. `sqrt(2 h^2)` for the Gaussian
    /// family.
    ///
    /// # Arguments
    /// * `bandwidth_sq` - Squared kernel bandwidth.
    fn bandwidth_factor(&self, bandwidth_sq: T) -> T;

    /// Fill `map` with 1-D derivative values per axis at the given normalized
    /// offset. Every column of `map` is written, so the caller controls the
    /// maximum derivative order through the table it allocates.
    ///
    /// # Arguments
    /// * `offset` - Normalized coordinate offset, one entry per axis.
    /// * `map` - Output table, `offset.len()` rows.
    fn directional_derivatives(&self, offset: &[T], map: &mut DerivativeMap<T>);

    /// Combine per-axis 1-D values into the mixed partial derivative implied
    /// by `multiindex`, a product over axes for separable kernels.
    ///
    /// # Arguments
    /// * `map` - Table previously filled by [`Self::directional_derivatives`].
    /// * `multiindex` - Per-axis derivative orders.
    fn partial_derivative(&self, map: &DerivativeMap<T>, multiindex: &[usize]) -> T;
}
