//! Local (incoming) expansion operators.
use std::fmt;
use std::sync::Arc;

use log::debug;
use num::Float;
use rayon::prelude::*;

use crate::expansion::check_point_range;
use crate::expansion::table::{binomial, MultiIndexTable};
use crate::expansion::types::{FarFieldExpansion, LocalExpansion};
use crate::traits::expansion::Expansion;
use crate::traits::kernel::{ExpansionKernel, KernelDerivative};
use crate::traits::region::Region;
use crate::traits::types::{DerivativeMap, ExpansionError};

impl<T, K> LocalExpansion<T, K>
where
    T: Float,
    K: ExpansionKernel<T>,
{
    /// Construct an empty local expansion anchored at `center`.
    ///
    /// # Arguments
    /// * `bandwidth` - Kernel bandwidth, strictly positive.
    /// * `center` - Expansion center, one coordinate per axis.
    /// * `table` - Shared multi-index table.
    pub fn new(
        bandwidth: T,
        center: &[T],
        table: Arc<MultiIndexTable<T>>,
    ) -> Result<Self, ExpansionError> {
        if center.len() != table.dim() {
            return Err(ExpansionError::DimensionMismatch(format!(
                "center has {} entries, table dimension is {}",
                center.len(),
                table.dim()
            )));
        }
        let kernel = K::new(bandwidth)?;
        let coeffs = vec![T::zero(); table.max_total_num_coeffs()];
        Ok(Self {
            kernel,
            derivative: K::Derivative::default(),
            center: center.to_vec(),
            coeffs,
            order: 0,
            table,
        })
    }

    /// Construct an empty local expansion centered at the origin of the
    /// table's coordinate space, to be re-anchored later with
    /// [`Self::set_center`].
    pub fn new_at_origin(
        bandwidth: T,
        table: Arc<MultiIndexTable<T>>,
    ) -> Result<Self, ExpansionError> {
        let center = vec![T::zero(); table.dim()];
        Self::new(bandwidth, &center, table)
    }

    /// Anchor the expansion at a center. Meaningful only before any
    /// accumulation or translation; once coefficients exist they are tied to
    /// the center they were built around.
    pub fn set_center(&mut self, center: &[T]) -> Result<(), ExpansionError> {
        if center.len() != self.table.dim() {
            return Err(ExpansionError::DimensionMismatch(format!(
                "center has {} entries, table dimension is {}",
                center.len(),
                self.table.dim()
            )));
        }
        self.center.copy_from_slice(center);
        Ok(())
    }

    /// Accumulate local coefficients directly from a contiguous range of raw
    /// source points, raising the current order to `order` if larger.
    ///
    /// Used when a source cluster is small enough that building the local
    /// expansion directly is cheaper than going through a far-field
    /// expansion and a translation. For every point the kernel's directional
    /// derivative table is evaluated at `(center - x_r) / bandwidth_factor`
    /// and each slot receives `neg_inv_factorial[alpha] * weight_r *
    /// partial_derivative(alpha)`.
    ///
    /// # Arguments
    /// * `coordinates` - Point-major coordinate slice, `[x_0, y_0, ..., x_1, y_1, ...]`.
    /// * `weights` - One weight per point.
    /// * `begin` - First point index of the range.
    /// * `end` - One past the last point index of the range.
    /// * `order` - Expansion order to accumulate to.
    pub fn accumulate_coeffs(
        &mut self,
        coordinates: &[T],
        weights: &[T],
        begin: usize,
        end: usize,
        order: usize,
    ) -> Result<(), ExpansionError> {
        let dim = self.table.dim();
        if order > self.table.max_order() {
            return Err(ExpansionError::OrderTooLarge {
                requested: order,
                max: self.table.max_order(),
            });
        }
        check_point_range(dim, coordinates, weights, begin, end)?;

        if order > self.order {
            self.order = order;
        }
        let total_num_coeffs = self.table.total_num_coeffs(order);
        let bandwidth_factor = self.derivative.bandwidth_factor(self.kernel.bandwidth_sq());
        let neg_inv_factorials = self.table.neg_inv_multiindex_factorials();

        let mut offset = vec![T::zero(); dim];
        let mut derivative_map = DerivativeMap::new(dim, order + 1);

        for r in begin..end {
            for d in 0..dim {
                offset[d] = (self.center[d] - coordinates[r * dim + d]) / bandwidth_factor;
            }
            self.derivative
                .directional_derivatives(&offset, &mut derivative_map);

            for j in 0..total_num_coeffs {
                let derivative = self
                    .derivative
                    .partial_derivative(&derivative_map, self.table.multiindex(j));
                self.coeffs[j] =
                    self.coeffs[j] + neg_inv_factorials[j] * weights[r] * derivative;
            }
        }
        Ok(())
    }

    /// Intentionally a no-op: local coefficients cannot be incrementally
    /// refined from new points once built, any refinement requires
    /// recomputation from scratch. The far-field expansion's counterpart is
    /// a true accumulation; this asymmetry is part of the contract.
    pub fn refine_coeffs(
        &mut self,
        _coordinates: &[T],
        _weights: &[T],
        _begin: usize,
        _end: usize,
        _order: usize,
    ) {
    }

    /// Evaluate the truncated series at a query point near the center.
    ///
    /// All monomials of the normalized query offset up to the current order
    /// are built with one multiplication each through the table's canonical
    /// recurrence, then dotted with the coefficients, so the cost is
    /// O(total_num_coeffs * dim) rather than recomputing each monomial from
    /// scratch. Read-only.
    ///
    /// # Arguments
    /// * `point` - Query point, one coordinate per axis.
    pub fn evaluate_field(&self, point: &[T]) -> T {
        let dim = self.table.dim();
        debug_assert_eq!(point.len(), dim);
        let total_num_coeffs = self.table.total_num_coeffs(self.order);
        let bandwidth_factor = self.derivative.bandwidth_factor(self.kernel.bandwidth_sq());

        let mut offset = vec![T::zero(); dim];
        for d in 0..dim {
            offset[d] = (point[d] - self.center[d]) / bandwidth_factor;
        }
        let mut monomials = vec![T::zero(); total_num_coeffs];
        self.table.monomials(&offset, self.order, &mut monomials);

        let mut sum = T::zero();
        for j in 0..total_num_coeffs {
            sum = sum + self.coeffs[j] * monomials[j];
        }
        sum
    }

    /// Evaluate the expansion at many query points at once, adding each
    /// potential into `potentials`. Queries are independent, so they are
    /// evaluated in parallel over an immutable expansion.
    ///
    /// # Arguments
    /// * `coordinates` - Point-major query coordinates.
    /// * `potentials` - One accumulator per query point.
    pub fn evaluate_field_batch(&self, coordinates: &[T], potentials: &mut [T])
    where
        T: Send + Sync,
        K: Sync,
        K::Derivative: Sync,
    {
        let dim = self.table.dim();
        debug_assert_eq!(coordinates.len(), potentials.len() * dim);
        potentials
            .par_iter_mut()
            .zip(coordinates.par_chunks_exact(dim))
            .for_each(|(potential, point)| {
                *potential = *potential + self.evaluate_field(point);
            });
    }

    /// Compute the minimum expansion order that provably evaluates within
    /// `max_error` for any query point in `region`, together with the error
    /// bound achieved at that order.
    ///
    /// Returns `None` when the approximation is infeasible: the region's
    /// widest extent is not strictly smaller than twice the bandwidth (the
    /// series is not guaranteed to converge), the required order exceeds the
    /// table's maximum, or a factorial term is out of range. Infeasibility
    /// is an expected outcome; the caller falls back to direct evaluation or
    /// finer subdivision.
    ///
    /// # Arguments
    /// * `region` - Target region the queries are drawn from.
    /// * `min_dist_sqd` - Minimum squared distance between `region` and the
    ///   source region.
    /// * `max_error` - Error tolerance the expansion must satisfy.
    pub fn order_for_evaluating<R>(
        &self,
        region: &R,
        min_dist_sqd: T,
        max_error: T,
    ) -> Option<(usize, T)>
    where
        R: Region<Scalar = T>,
    {
        let dim = self.table.dim();
        debug_assert_eq!(region.dim(), dim);
        let bandwidth_sq = self.kernel.bandwidth_sq();
        let four = T::from(4.0).unwrap();
        let two = T::from(2.0).unwrap();

        let front_factor = (-min_dist_sqd / (four * bandwidth_sq)).exp();
        let mut widest_width = T::zero();
        for d in 0..dim {
            widest_width = widest_width.max(region.width(d));
        }
        let ratio = widest_width / (two * bandwidth_sq.sqrt());

        // Without strict separation the Taylor series is not guaranteed to
        // converge over the whole region.
        if ratio >= T::one() {
            debug!("order selection infeasible, region/bandwidth ratio >= 1");
            return None;
        }

        let mut ratio_raised = T::one();
        let mut p = 0usize;
        loop {
            if p > self.table.max_order() {
                debug!(
                    "order selection infeasible, exceeded table maximum {}",
                    self.table.max_order()
                );
                return None;
            }
            ratio_raised = ratio_raised * ratio;

            let floor_factorial = self.table.factorial(p / dim)?;
            let ceil_factorial = self.table.factorial(p.div_ceil(dim))?;
            let remainder = p % dim;

            // Number of coefficients gained between order p and p + 1,
            // computed analytically so the search is not capped by the
            // table's per-order list.
            let delta_coeffs =
                T::from(binomial(p + 1 + dim, dim) - binomial(p + dim, dim)).unwrap();
            let denominator = (floor_factorial.powi((dim - remainder) as i32)
                * ceil_factorial.powi(remainder as i32))
            .sqrt();
            let bound = front_factor * delta_coeffs * ratio_raised / denominator;

            if bound <= max_error {
                debug!("order selection satisfied at order {p}");
                return Some((p, bound));
            }
            p += 1;
        }
    }

    /// Convert a far-field expansion into this local expansion (far-to-local
    /// translation), adding into the existing coefficients and raising this
    /// expansion's order to the source's if larger.
    ///
    /// The kernel's directional derivatives of the normalized center-to-center
    /// displacement are taken up to twice the order; every destination index
    /// beta receives `sum_alpha far_coeff_alpha * partial_derivative(beta +
    /// alpha)`, with positive and negative products gathered in separate
    /// running sums and combined only at the end to control cancellation,
    /// then scaled by the negated inverse factorials.
    ///
    /// # Arguments
    /// * `source` - Far-field expansion to convert; must be bound to the
    ///   same multi-index table.
    pub fn translate_from_far_field(
        &mut self,
        source: &FarFieldExpansion<T, K>,
    ) -> Result<(), ExpansionError> {
        if !Arc::ptr_eq(&self.table, &source.table) {
            return Err(ExpansionError::TableMismatch);
        }
        let dim = self.table.dim();
        let far_order = source.order();
        let total_num_coeffs = self.table.total_num_coeffs(far_order);
        let bandwidth_factor = self.derivative.bandwidth_factor(source.bandwidth_sq());

        if far_order > self.order {
            self.order = far_order;
        }

        // Mixed partials at beta + alpha reach per-axis order 2 * order.
        let limit = 2 * self.order + 1;
        let mut derivative_map = DerivativeMap::new(dim, limit);
        let mut center_diff = vec![T::zero(); dim];
        for d in 0..dim {
            center_diff[d] = (self.center[d] - source.center()[d]) / bandwidth_factor;
        }
        self.derivative
            .directional_derivatives(&center_diff, &mut derivative_map);

        let mut pos_sums = vec![T::zero(); total_num_coeffs];
        let mut neg_sums = vec![T::zero(); total_num_coeffs];
        let mut beta_plus_alpha = vec![0usize; dim];

        for j in 0..total_num_coeffs {
            let beta = self.table.multiindex(j);
            for k in 0..total_num_coeffs {
                let alpha = self.table.multiindex(k);
                for d in 0..dim {
                    beta_plus_alpha[d] = beta[d] + alpha[d];
                }
                let derivative = self
                    .derivative
                    .partial_derivative(&derivative_map, &beta_plus_alpha);
                let prod = source.coeffs()[k] * derivative;
                if prod > T::zero() {
                    pos_sums[j] = pos_sums[j] + prod;
                } else {
                    neg_sums[j] = neg_sums[j] + prod;
                }
            }
        }

        let neg_inv_factorials = self.table.neg_inv_multiindex_factorials();
        for j in 0..total_num_coeffs {
            self.coeffs[j] =
                self.coeffs[j] + (pos_sums[j] + neg_sums[j]) * neg_inv_factorials[j];
        }
        Ok(())
    }

    /// Shift this local expansion to the center of `destination`
    /// (local-to-local translation).
    ///
    /// CONTRACT: this operator mutates its **argument**, not the receiver.
    /// The receiver's coefficients are read, re-centered, and added into
    /// `destination`'s coefficients; `destination`'s order is raised to the
    /// receiver's if lower. This is the mirror image of
    /// [`Self::translate_from_far_field`], which mutates the receiver;
    /// call sites must not confuse the two.
    ///
    /// Only multi-indices dominating each destination index contribute,
    /// taken from the table's precomputed upper mapping so the inner loop
    /// walks valid (beta, alpha) pairs only; positive and negative
    /// contributions are gathered separately before being combined.
    ///
    /// # Arguments
    /// * `destination` - Local expansion to add the shifted coefficients
    ///   into; must be bound to the same multi-index table.
    pub fn translate_to_local(
        &self,
        destination: &mut LocalExpansion<T, K>,
    ) -> Result<(), ExpansionError> {
        if !Arc::ptr_eq(&self.table, &destination.table) {
            return Err(ExpansionError::TableMismatch);
        }
        let dim = self.table.dim();
        let total_num_coeffs = self.table.total_num_coeffs(self.order);
        let bandwidth_factor = self.derivative.bandwidth_factor(self.kernel.bandwidth_sq());

        let mut center_diff = vec![T::zero(); dim];
        for d in 0..dim {
            center_diff[d] = (destination.center()[d] - self.center[d]) / bandwidth_factor;
        }

        if destination.order < self.order {
            destination.order = self.order;
        }

        for j in 0..total_num_coeffs {
            let alpha = self.table.multiindex(j);
            let mut pos_sum = T::zero();
            let mut neg_sum = T::zero();

            for &beta_pos in self.table.upper_mapping(j) {
                // Upper mappings are sorted, indices beyond the current
                // order carry no coefficients.
                if beta_pos >= total_num_coeffs {
                    break;
                }
                let beta = self.table.multiindex(beta_pos);
                let mut diff_power = T::one();
                for d in 0..dim {
                    diff_power = diff_power * center_diff[d].powi((beta[d] - alpha[d]) as i32);
                }
                let prod = self.coeffs[beta_pos]
                    * diff_power
                    * self.table.n_multichoose_k_by_pos(beta_pos, j);
                if prod > T::zero() {
                    pos_sum = pos_sum + prod;
                } else {
                    neg_sum = neg_sum + prod;
                }
            }
            destination.coeffs[j] = destination.coeffs[j] + pos_sum + neg_sum;
        }
        Ok(())
    }
}

impl<T, K> fmt::Display for LocalExpansion<T, K>
where
    T: Float + fmt::Display,
    K: ExpansionKernel<T>,
{
    /// Renders the expansion as a human-readable polynomial-in-kernel-sum
    /// expression; diagnostic only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = self.table.dim();
        let total_num_coeffs = self.table.total_num_coeffs(self.order);

        write!(f, "local expansion, center (")?;
        for d in 0..dim {
            write!(f, "{}{}", self.center[d], if d + 1 < dim { ", " } else { "" })?;
        }
        writeln!(f, "), order {}", self.order)?;

        write!(f, "f(")?;
        for d in 0..dim {
            write!(f, "x_q{}{}", d, if d + 1 < dim { "," } else { "" })?;
        }
        write!(f, ") = sum_{{x_r in R}} K(||x_q - x_r||) = ")?;
        for j in 0..total_num_coeffs {
            let mapping = self.table.multiindex(j);
            write!(f, "{}", self.coeffs[j])?;
            for d in 0..dim {
                write!(f, " (x_q{} - ({}))^{}", d, self.center[d], mapping[d])?;
            }
            if j + 1 < total_num_coeffs {
                write!(f, " + ")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::Domain;
    use crate::helpers::{direct_kernel_sum, points_fixture};
    use crate::kernel::epanechnikov::EpanechnikovKernel;
    use crate::kernel::gaussian::GaussianKernel;
    use approx::assert_relative_eq;

    fn gaussian_local(
        dim: usize,
        max_order: usize,
        bandwidth: f64,
        center: &[f64],
    ) -> LocalExpansion<f64, GaussianKernel<f64>> {
        let table = Arc::new(MultiIndexTable::new(dim, max_order).unwrap());
        LocalExpansion::new(bandwidth, center, table).unwrap()
    }

    #[test]
    fn test_construction_at_origin() {
        let table = Arc::new(MultiIndexTable::<f64>::new(3, 4).unwrap());
        let mut expansion: LocalExpansion<f64, GaussianKernel<f64>> =
            LocalExpansion::new_at_origin(1.0, table).unwrap();
        assert_eq!(expansion.center(), &[0.0, 0.0, 0.0]);
        expansion.set_center(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(expansion.center(), &[1.0, 2.0, 3.0]);
        assert!(expansion.set_center(&[1.0]).is_err());
    }

    #[test]
    fn test_accumulation_matches_direct_sum() {
        // Sources well separated from the center, query close to it.
        let coordinates = [2.0, 0.0, 0.0, 2.0, -1.5, 1.5];
        let weights = [1.0, 0.5, 2.0];
        let kernel = GaussianKernel::new(1.0).unwrap();

        let mut expansion = gaussian_local(2, 10, 1.0, &[0.0, 0.0]);
        expansion
            .accumulate_coeffs(&coordinates, &weights, 0, 3, 10)
            .unwrap();

        let query = [0.05, -0.03];
        let direct = direct_kernel_sum(&kernel, &coordinates, &weights, &query);
        let approximated = expansion.evaluate_field(&query);
        assert_relative_eq!(approximated, direct, max_relative = 1e-9);
    }

    #[test]
    fn test_refine_is_a_no_op() {
        let coordinates = [2.0, 0.0];
        let weights = [1.0];
        let mut expansion = gaussian_local(2, 6, 1.0, &[0.0, 0.0]);
        expansion
            .accumulate_coeffs(&coordinates, &weights, 0, 1, 4)
            .unwrap();
        let coeffs_before = expansion.coeffs().to_vec();
        expansion.refine_coeffs(&coordinates, &weights, 0, 1, 6);
        assert_eq!(expansion.coeffs(), coeffs_before.as_slice());
        assert_eq!(expansion.order(), 4);
    }

    #[test]
    fn test_zero_weights_leave_coefficients_unchanged() {
        let coordinates = points_fixture::<f64>(2, 8, 1.5, 2.5, 4);
        let weights = vec![0.0; 8];
        let mut expansion = gaussian_local(2, 5, 1.0, &[0.0, 0.0]);
        expansion
            .accumulate_coeffs(&coordinates, &weights, 0, 8, 5)
            .unwrap();
        assert!(expansion.coeffs().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_double_weights_match_double_accumulation() {
        let coordinates = points_fixture::<f64>(2, 8, 1.5, 2.5, 2);
        let weights: Vec<f64> = (0..8).map(|i| 0.25 + 0.1 * i as f64).collect();
        let doubled: Vec<f64> = weights.iter().map(|w| 2.0 * w).collect();

        let mut twice = gaussian_local(2, 4, 1.0, &[0.0, 0.0]);
        twice
            .accumulate_coeffs(&coordinates, &weights, 0, 8, 4)
            .unwrap();
        twice
            .accumulate_coeffs(&coordinates, &weights, 0, 8, 4)
            .unwrap();

        let mut once = gaussian_local(2, 4, 1.0, &[0.0, 0.0]);
        once.accumulate_coeffs(&coordinates, &doubled, 0, 8, 4)
            .unwrap();

        let n = once.table().total_num_coeffs(4);
        for j in 0..n {
            assert_relative_eq!(twice.coeffs()[j], once.coeffs()[j], max_relative = 1e-12);
        }
    }

    #[test]
    fn test_epanechnikov_exact_at_twice_the_dimension() {
        // The product kernel is a polynomial of degree 2 per axis, total
        // degree 2 * dim, so with every offset inside the support the
        // expansion reproduces it exactly once the order reaches 2 * dim.
        let coordinates = [0.3, -0.2, -0.25, 0.35, 0.1, 0.15];
        let weights = [1.0, 0.5, 2.0];
        let kernel = EpanechnikovKernel::new(1.0).unwrap();
        let query = [0.12, -0.08];
        let direct = direct_kernel_sum(&kernel, &coordinates, &weights, &query);

        let table = Arc::new(MultiIndexTable::new(2, 4).unwrap());
        let mut truncated: LocalExpansion<f64, EpanechnikovKernel<f64>> =
            LocalExpansion::new_at_origin(1.0, Arc::clone(&table)).unwrap();
        truncated
            .accumulate_coeffs(&coordinates, &weights, 0, 3, 2)
            .unwrap();
        assert!((truncated.evaluate_field(&query) - direct).abs() > 1e-5);

        let mut exact: LocalExpansion<f64, EpanechnikovKernel<f64>> =
            LocalExpansion::new_at_origin(1.0, table).unwrap();
        exact
            .accumulate_coeffs(&coordinates, &weights, 0, 3, 4)
            .unwrap();
        assert_relative_eq!(exact.evaluate_field(&query), direct, max_relative = 1e-12);
    }

    #[test]
    fn test_order_selector_infeasible_without_separation() {
        let expansion = gaussian_local(2, 8, 1.0, &[5.0, 5.0]);
        // Widest width 2.0 against 2 * sqrt(bandwidth_sq) = 2.0, ratio 1.
        let region = Domain::new(&[4.0, 4.0], &[2.0, 1.0]).unwrap();
        assert!(expansion
            .order_for_evaluating(&region, 30.0, 1e-6)
            .is_none());
    }

    #[test]
    fn test_order_selector_infeasible_beyond_max_order() {
        let expansion = gaussian_local(2, 4, 1.0, &[5.0, 5.0]);
        let region = Domain::new(&[4.8, 4.8], &[0.4, 0.4]).unwrap();
        // A tolerance this tight needs more than four orders.
        assert!(expansion
            .order_for_evaluating(&region, 30.0, 1e-30)
            .is_none());
    }

    #[test]
    fn test_order_selector_monotone_in_tolerance() {
        let expansion = gaussian_local(2, 12, 1.0, &[5.0, 5.0]);
        let region = Domain::new(&[4.8, 4.8], &[0.4, 0.4]).unwrap();
        let min_dist_sqd = 30.0;

        let mut previous_order = 0;
        for &tolerance in &[1e-4, 1e-6, 1e-8, 1e-10] {
            let (order, achieved) = expansion
                .order_for_evaluating(&region, min_dist_sqd, tolerance)
                .unwrap();
            assert!(achieved <= tolerance);
            // Tightening the tolerance never decreases the returned order.
            assert!(order >= previous_order);
            previous_order = order;
        }
    }

    #[test]
    fn test_end_to_end_far_field_to_local() {
        // Two unit-weight sources, far-field at (0.5, 0), local at (5, 5),
        // query at (5, 5.1); the approximation must match the direct sum
        // within the bound reported by the order selector.
        let coordinates = [0.0, 0.0, 1.0, 0.0];
        let weights = [1.0, 1.0];
        let kernel = GaussianKernel::new(1.0).unwrap();
        let table = Arc::new(MultiIndexTable::new(2, 12).unwrap());

        let local_center = [5.0, 5.0];
        let region = Domain::new(&[4.8, 4.8], &[0.4, 0.4]).unwrap();
        // Squared distance between region corner (4.8, 4.8) and the nearest
        // source (1, 0).
        let min_dist_sqd = 3.8f64.powi(2) + 4.8f64.powi(2);

        let local: LocalExpansion<f64, GaussianKernel<f64>> =
            LocalExpansion::new(1.0, &local_center, table.clone()).unwrap();
        let (order, achieved_error) = local
            .order_for_evaluating(&region, min_dist_sqd, 1e-10)
            .unwrap();

        let mut farfield: FarFieldExpansion<f64, GaussianKernel<f64>> =
            FarFieldExpansion::new(1.0, &[0.5, 0.0], table.clone()).unwrap();
        farfield
            .accumulate_coeffs(&coordinates, &weights, 0, 2, order)
            .unwrap();

        let mut local = local;
        local.translate_from_far_field(&farfield).unwrap();

        let query = [5.0, 5.1];
        let direct = direct_kernel_sum(&kernel, &coordinates, &weights, &query);
        let approximated = local.evaluate_field(&query);
        assert!(
            (approximated - direct).abs() <= achieved_error,
            "error {} exceeds bound {}",
            (approximated - direct).abs(),
            achieved_error
        );
    }

    #[test]
    fn test_local_to_local_round_trip() {
        let coordinates = [2.0, 0.0, 0.0, 2.0, -1.5, 1.5];
        let weights = [1.0, 0.5, 2.0];
        let table = Arc::new(MultiIndexTable::new(2, 8).unwrap());

        let mut original: LocalExpansion<f64, GaussianKernel<f64>> =
            LocalExpansion::new(1.0, &[0.0, 0.0], table.clone()).unwrap();
        original
            .accumulate_coeffs(&coordinates, &weights, 0, 3, 8)
            .unwrap();

        let mut shifted: LocalExpansion<f64, GaussianKernel<f64>> =
            LocalExpansion::new(1.0, &[0.05, -0.05], table).unwrap();
        original.translate_to_local(&mut shifted).unwrap();

        // Receiver untouched, argument raised to the receiver's order.
        assert_eq!(shifted.order(), 8);

        // Re-centering a truncated polynomial is exact, so both expansions
        // agree wherever the original converges.
        let query = [0.02, 0.03];
        assert_relative_eq!(
            shifted.evaluate_field(&query),
            original.evaluate_field(&query),
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_translate_to_local_mutates_argument_only() {
        let coordinates = [2.0, 0.0];
        let weights = [1.0];
        let table = Arc::new(MultiIndexTable::new(2, 4).unwrap());

        let mut source: LocalExpansion<f64, GaussianKernel<f64>> =
            LocalExpansion::new(1.0, &[0.0, 0.0], table.clone()).unwrap();
        source
            .accumulate_coeffs(&coordinates, &weights, 0, 1, 4)
            .unwrap();
        let source_coeffs = source.coeffs().to_vec();

        let mut destination: LocalExpansion<f64, GaussianKernel<f64>> =
            LocalExpansion::new(1.0, &[0.1, 0.0], table).unwrap();
        source.translate_to_local(&mut destination).unwrap();

        assert_eq!(source.coeffs(), source_coeffs.as_slice());
        assert_eq!(source.order(), 4);
        assert_eq!(destination.order(), 4);
        assert!(destination.coeffs().iter().any(|&c| c != 0.0));
    }

    #[test]
    fn test_batch_evaluation_matches_pointwise() {
        let coordinates = [2.0, 0.0, 0.0, 2.0];
        let weights = [1.0, 1.0];
        let mut expansion = gaussian_local(2, 8, 1.0, &[0.0, 0.0]);
        expansion
            .accumulate_coeffs(&coordinates, &weights, 0, 2, 8)
            .unwrap();

        let queries = points_fixture::<f64>(2, 32, -0.1, 0.1, 5);
        let mut potentials = vec![0.0; 32];
        expansion.evaluate_field_batch(&queries, &mut potentials);
        for (i, &potential) in potentials.iter().enumerate() {
            let expected = expansion.evaluate_field(&queries[i * 2..(i + 1) * 2]);
            assert_relative_eq!(potential, expected, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_display_does_not_mutate() {
        let coordinates = [2.0, 0.0];
        let weights = [1.0];
        let mut expansion = gaussian_local(2, 3, 1.0, &[0.0, 0.0]);
        expansion
            .accumulate_coeffs(&coordinates, &weights, 0, 1, 3)
            .unwrap();
        let coeffs_before = expansion.coeffs().to_vec();
        let rendered = format!("{}", expansion);
        assert!(rendered.contains("local expansion"));
        assert!(rendered.contains("x_q0"));
        assert_eq!(expansion.coeffs(), coeffs_before.as_slice());
        assert_eq!(expansion.order(), 3);
    }
}
