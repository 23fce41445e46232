//! Gaussian kernel family.
use num::Float;

use crate::traits::kernel::{ExpansionKernel, KernelDerivative};
use crate::traits::types::{DerivativeMap, ExpansionError};

/// Gaussian kernel `K(d) = exp(-d^2 / (2 h^2))`.
#[derive(Debug, Clone, Copy)]
pub struct GaussianKernel<T> {
    bandwidth_sq: T,
}

/// Derivative policy for the Gaussian family.
///
/// With offsets normalized by `sqrt(2 h^2)` the kernel separates into
/// `prod_d exp(-x_d^2)`, whose signed derivatives are the Hermite functions
/// `h_n(x) = (-1)^n d^n/dx^n exp(-x^2)`, generated by the three-term
/// recurrence `h_n = 2 x h_{n-1} - 2 (n - 1) h_{n-2}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianDerivative;

impl<T> ExpansionKernel<T> for GaussianKernel<T>
where
    T: Float,
{
    type Derivative = GaussianDerivative;

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
        let two = T::from(2.0).unwrap();
        let sq_dist = displacement
            .iter()
            .fold(T::zero(), |acc, &x| acc + x * x);
        (-sq_dist / (two * self.bandwidth_sq)).exp()
    }
}

impl<T> KernelDerivative<T> for GaussianDerivative
where
    T: Float,
{
    fn bandwidth_factor(&self, bandwidth_sq: T) -> T {
        (T::from(2.0).unwrap() * bandwidth_sq).sqrt()
    }

    fn directional_derivatives(&self, offset: &[T], map: &mut DerivativeMap<T>) {
        let two = T::from(2.0).unwrap();
        let num_orders = map.num_orders();
        for (d, &x) in offset.iter().enumerate() {
            map.set(d, 0, (-x * x).exp());
            if num_orders > 1 {
                map.set(d, 1, two * x * map.get(d, 0));
            }
            for n in 2..num_orders {
                let n_minus_one = T::from(n - 1).unwrap();
                map.set(
                    d,
                    n,
                    two * x * map.get(d, n - 1) - two * n_minus_one * map.get(d, n - 2),
                );
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
