//! Helper functions used in testing and benchmarking expansions,
//! specifically point-cloud fixtures and direct kernel summation.
use num::Float;
use rand::prelude::*;

use crate::traits::kernel::ExpansionKernel;

/// Points fixture for testing, uniformly samples each axis from `min` to
/// `max` with a seeded generator.
///
/// # Arguments
/// * `dim` - Number of spatial dimensions.
/// * `n_points` - Number of points to sample.
/// * `min` - Minimum coordinate value along each axis.
/// * `max` - Maximum coordinate value along each axis.
/// * `seed` - Random seed.
pub fn points_fixture<T>(dim: usize, n_points: usize, min: T, max: T, seed: u64) -> Vec<T>
where
    T: Float + rand::distributions::uniform::SampleUniform,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let between = rand::distributions::Uniform::from(min..max);
    (0..n_points * dim).map(|_| between.sample(&mut rng)).collect()
}

/// Direct O(N) weighted kernel sum at a single query point, the reference
/// the expansions approximate.
///
/// # Arguments
/// * `kernel` - Kernel to evaluate.
/// * `coordinates` - Point-major source coordinates.
/// * `weights` - One weight per source point.
/// * `query` - Query point; its length fixes the dimension.
pub fn direct_kernel_sum<T, K>(kernel: &K, coordinates: &[T], weights: &[T], query: &[T]) -> T
where
    T: Float,
    K: ExpansionKernel<T>,
{
    let dim = query.len();
    let mut displacement = vec![T::zero(); dim];
    coordinates
        .chunks_exact(dim)
        .zip(weights.iter())
        .fold(T::zero(), |acc, (point, &weight)| {
            for d in 0..dim {
                displacement[d] = query[d] - point[d];
            }
            acc + weight * kernel.evaluate(&displacement)
        })
}
