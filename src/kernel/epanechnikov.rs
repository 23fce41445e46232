//! Epanechnikov product kernel family.
use num::Float;

use crate::traits::kernel::{ExpansionKernel, KernelDerivative};
use crate::traits::types::{DerivativeMap, ExpansionError};

/// Multiplicative Epanechnikov kernel
/// `K(q, r) = prod_d max(0, 1 - (q_d - r_d)^2 / h^2)`.
///
/// Expansions built with this family are valid for offsets inside the kernel
/// support (`|offset| < h` per axis). The kernel is a polynomial of degree 2
/// per axis, hence total degree `2 * dim`, so expansions are exact there once
/// the order reaches `2 * dim`.
#[derive(Debug, Clone, Copy)]
pub struct EpanechnikovKernel<T> {
    bandwidth_sq: T,
}

/// Derivative policy for the Epanechnikov product family.
///
/// Offsets are normalized by `h`, so per axis the profile is `1 - x^2`:
/// signed derivatives `(-1)^n d^n/dx^n` are `1 - x^2`, `2x`, `-2`, then
/// identically zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpanechnikovDerivative;

impl<T> ExpansionKernel<T> for EpanechnikovKernel<T>
where
    T: Float,
{
    type Derivative = EpanechnikovDerivative;

    fn new(bandwidth: T) -> Result<Self, ExpansionError> {
        if bandwidth <= T::zero() {
            return Err(ExpansionError::InvalidBandwidth);
        }
        Ok(Self {
            bandwidth_sq: bandwidth * bandwidth,
        })
    }

    fn bandwidth_sq(&self) -> T {
        self.bandwidth_sq
    }

    fn evaluate(&self, displacement: &[T]) -> T {
        displacement.iter().fold(T::one(), |acc, &x| {
            acc * (T::one() - x * x / self.bandwidth_sq).max(T::zero())
        })
    }
}

impl<T> KernelDerivative<T> for EpanechnikovDerivative
where
    T: Float,
{
    fn bandwidth_factor(&self, bandwidth_sq: T) -> T {
        bandwidth_sq.sqrt()
    }

    fn directional_derivatives(&self, offset: &[T], map: &mut DerivativeMap<T>) {
        let two = T::from(2.0).unwrap();
        let num_orders = map.num_orders();
        for (d, &x) in offset.iter().enumerate() {
            map.set(d, 0, T::one() - x * x);
            if num_orders > 1 {
                map.set(d, 1, two * x);
            }
            if num_orders > 2 {
                map.set(d, 2, -two);
            }
            for n in 3..num_orders {
                map.set(d, n, T::zero());
            }
        }
    }

    fn partial_derivative(&self, map: &DerivativeMap<T>, multiindex: &[usize]) -> T {
        multiindex
            .iter()
            .enumerate()
            .fold(T::one(), |acc, (d, &n)| acc * map.get(d, n))
    }
}
