//! Far-field (outgoing) expansion operators.
use std::fmt;
use std::sync::Arc;

use num::Float;

use crate::expansion::check_point_range;
use crate::expansion::table::MultiIndexTable;
use crate::expansion::types::FarFieldExpansion;
use crate::traits::expansion::Expansion;
use crate::traits::kernel::{ExpansionKernel, KernelDerivative};
use crate::traits::types::{DerivativeMap, ExpansionError};

impl<T, K> FarFieldExpansion<T, K>
where
    T: Float,
    K: ExpansionKernel<T>,
{
    /// Construct an empty far-field expansion anchored at `center`.
    ///
    /// The expansion starts at order zero with zeroed coefficients sized for
    /// the table's maximum order; the center and the table binding are fixed
    /// for the lifetime of the object.
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

    /// Accumulate the moments of a contiguous point range into the
    /// coefficients, raising the current order to `order` if larger.
    ///
    /// For every point the normalized offset `(x_r - center) /
    /// bandwidth_factor` is formed and all monomials of degree <= `order`
    /// are built through the canonical recurrence; weighted monomials are
    /// gathered into separate positive and negative running sums per slot to
    /// control cancellation, combined once, scaled by the positive inverse
    /// multi-index factorials and added into the stored coefficients.
    ///
    /// The operation is additive: repeated calls over disjoint ranges refine
    /// the expansion as more sources are discovered.
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

        let mut pos_coeffs = vec![T::zero(); total_num_coeffs];
        let mut neg_coeffs = vec![T::zero(); total_num_coeffs];
        let mut offset = vec![T::zero(); dim];
        let mut monomials = vec![T::zero(); total_num_coeffs];

        for r in begin..end {
            for d in 0..dim {
                offset[d] = (coordinates[r * dim + d] - self.center[d]) / bandwidth_factor;
            }
            self.table.monomials(&offset, order, &mut monomials);

            for (j, &monomial) in monomials.iter().enumerate() {
                let prod = weights[r] * monomial;
                if prod > T::zero() {
                    pos_coeffs[j] = pos_coeffs[j] + prod;
                } else {
                    neg_coeffs[j] = neg_coeffs[j] + prod;
                }
            }
        }

        let inv_factorials = self.table.inv_multiindex_factorials();
        for j in 0..total_num_coeffs {
            self.coeffs[j] = self.coeffs[j] + (pos_coeffs[j] + neg_coeffs[j]) * inv_factorials[j];
        }
        Ok(())
    }

    /// Incrementally refine the expansion from further source points.
    ///
    /// Far-field coefficients are plain weighted moments, so refinement is
    /// the same additive accumulation; this simply delegates to
    /// [`Self::accumulate_coeffs`]. The local expansion deliberately does
    /// not share this property.
    pub fn refine_coeffs(
        &mut self,
        coordinates: &[T],
        weights: &[T],
        begin: usize,
        end: usize,
        order: usize,
    ) -> Result<(), ExpansionError> {
        self.accumulate_coeffs(coordinates, weights, begin, end, order)
    }

    /// Evaluate the truncated series at a query point far from the center.
    ///
    /// Builds the kernel's directional derivative table at the normalized
    /// query offset and contracts it with the stored moments. Read-only.
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
        let mut derivative_map = DerivativeMap::new(dim, self.order + 1);
        self.derivative
            .directional_derivatives(&offset, &mut derivative_map);

        let mut sum = T::zero();
        for j in 0..total_num_coeffs {
            let derivative = self
                .derivative
                .partial_derivative(&derivative_map, self.table.multiindex(j));
            sum = sum + self.coeffs[j] * derivative;
        }
        sum
    }

    /// Shift another far-field expansion into this one (far-to-far
    /// translation), adding into the existing coefficients.
    ///
    /// Re-centers the source's moments through
    /// `A'_beta += sum_{alpha <= beta} A_alpha * delta^(beta-alpha) /
    /// (beta-alpha)!` with `delta` the normalized center difference, and
    /// raises this expansion's order to the source's if larger.
    ///
    /// # Arguments
    /// * `source` - Far-field expansion to re-center here; must be bound to
    ///   the same multi-index table.
    pub fn translate_from_far_field(
        &mut self,
        source: &FarFieldExpansion<T, K>,
    ) -> Result<(), ExpansionError> {
        if !Arc::ptr_eq(&self.table, &source.table) {
            return Err(ExpansionError::TableMismatch);
        }
        let dim = self.table.dim();
        let order = source.order();
        let total_num_coeffs = self.table.total_num_coeffs(order);
        let bandwidth_factor = self.derivative.bandwidth_factor(source.bandwidth_sq());

        if self.order < order {
            self.order = order;
        }

        let mut center_diff = vec![T::zero(); dim];
        for d in 0..dim {
            center_diff[d] = (source.center()[d] - self.center[d]) / bandwidth_factor;
        }

        let inv_factorials = self.table.inv_multiindex_factorials();
        let mut diff_index = vec![0usize; dim];
        for j in 0..total_num_coeffs {
            let beta = self.table.multiindex(j);
            let mut pos_sum = T::zero();
            let mut neg_sum = T::zero();

            for k in 0..total_num_coeffs {
                let alpha = self.table.multiindex(k);
                if alpha.iter().zip(beta.iter()).any(|(a, b)| a > b) {
                    continue;
                }
                let mut diff_power = T::one();
                for d in 0..dim {
                    diff_index[d] = beta[d] - alpha[d];
                    diff_power = diff_power * center_diff[d].powi(diff_index[d] as i32);
                }
                // beta - alpha has order <= beta's, so the position lookup
                // cannot fail for an enumerated beta.
                let diff_pos = self.table.multiindex_position(&diff_index).unwrap();
                let prod = source.coeffs()[k] * diff_power * inv_factorials[diff_pos];
                if prod > T::zero() {
                    pos_sum = pos_sum + prod;
                } else {
                    neg_sum = neg_sum + prod;
                }
            }
            self.coeffs[j] = self.coeffs[j] + pos_sum + neg_sum;
        }
        Ok(())
    }
}

impl<T, K> fmt::Display for FarFieldExpansion<T, K>
where
    T: Float + fmt::Display,
    K: ExpansionKernel<T>,
{
    /// Renders the expansion as a human-readable polynomial-in-kernel-sum
    /// expression; diagnostic only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = self.table.dim();
        let total_num_coeffs = self.table.total_num_coeffs(self.order);

        write!(f, "far-field expansion, center (")?;
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
