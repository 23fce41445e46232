//! Utility types shared by the trait definitions.
use num::Float;
use thiserror::Error;

/// Type to handle errors raised by expansion construction and accumulation.
///
/// Infeasibility of the order selector is not an error; it is reported as
/// `None` by [`crate::LocalExpansion::order_for_evaluating`]. The variants
/// here are precondition failures that indicate a configuration bug in the
/// caller and are never silently clamped.
#[derive(Error, Debug)]
pub enum ExpansionError {
    /// Kernel bandwidth must be strictly positive.
    #[error("kernel bandwidth must be strictly positive")]
    InvalidBandwidth,

    /// Multi-index tables require at least one spatial dimension.
    #[error("multi-index tables require at least one spatial dimension")]
    InvalidDimension,

    /// Slice lengths disagree with the dimension of the bound table.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A requested expansion order exceeds the maximum the bound table was
    /// built for.
    #[error("requested order {requested} exceeds table maximum {max}")]
    OrderTooLarge {
        /// Order requested by the caller.
        requested: usize,
        /// Maximum order supported by the bound table.
        max: usize,
    },

    /// Two expansions taking part in a translation are bound to different
    /// multi-index tables.
    #[error("expansions are bound to different multi-index tables")]
    TableMismatch,
}

/// Table of per-axis directional derivative values, filled by a
/// [`crate::traits::kernel::KernelDerivative`] policy.
///
/// Row `d` holds the 1-D values for axis `d`; column `n` holds the value for
/// derivative order `n`, with the sign convention `(-1)^n d^n/dx^n K_d(x)`
/// for a separable kernel `K = prod_d K_d`.
#[derive(Debug, Clone)]
pub struct DerivativeMap<T> {
    dim: usize,
    num_orders: usize,
    data: Vec<T>,
}

impl<T> DerivativeMap<T>
where
    T: Float,
{
    /// Allocate a zeroed table with `num_orders` derivative columns per axis.
    pub fn new(dim: usize, num_orders: usize) -> Self {
        Self {
            dim,
            num_orders,
            data: vec![T::zero(); dim * num_orders],
        }
    }

    /// Number of spatial dimensions (rows).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of derivative orders held per axis (columns).
    pub fn num_orders(&self) -> usize {
        self.num_orders
    }

    /// Value for axis `axis` at derivative order `order`.
    #[inline]
    pub fn get(&self, axis: usize, order: usize) -> T {
        self.data[axis * self.num_orders + order]
    }

    /// Store a value for axis `axis` at derivative order `order`.
    #[inline]
    pub fn set(&mut self, axis: usize, order: usize, value: T) {
        self.data[axis * self.num_orders + order] = value;
    }
}
