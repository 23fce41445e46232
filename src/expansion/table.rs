//! Shared multi-index table for series expansions.
//!
//! A [`MultiIndexTable`] enumerates all exponent vectors of a fixed dimension
//! up to a maximum order in a canonical order, and precomputes every scalar
//! derived from that enumeration: factorials, signed inverse multi-index
//! factorials, the dominator ("upper mapping") adjacency used by
//! local-to-local translation, and pairwise multichoose coefficients. One
//! table is built per (dimension, maximum order, kernel family) and shared by
//! reference across every expansion that uses it; construction cost is
//! quadratic in the number of coefficients and amortized by sharing.
use std::collections::HashMap;

use num::Float;

use crate::traits::types::ExpansionError;

/// Binomial coefficient C(n, k), computed with the multiplicative formula.
pub(crate) fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result = 1usize;
    for i in 1..=k {
        result = result * (n - k + i) / i;
    }
    result
}

/// Precomputed multi-index enumeration and derived scalar tables.
///
/// Immutable after construction. Expansions hold a non-owning handle
/// (`Arc`) and never mutate the table; the table must outlive every
/// expansion bound to it, which the `Arc` enforces.
#[derive(Debug)]
pub struct MultiIndexTable<T> {
    dim: usize,
    max_order: usize,
    /// Number of multi-indices of order <= p, indexed by p.
    list_total_num_coeffs: Vec<usize>,
    /// Canonical enumeration of multi-indices, grouped by total degree and,
    /// within a degree, by the axis last incremented. The monomial and
    /// coefficient recurrences in the expansion code rely on this ordering.
    multiindex_mapping: Vec<Vec<usize>>,
    /// 1/alpha! per enumerated multi-index alpha.
    inv_multiindex_factorials: Vec<T>,
    /// (-1)^|alpha|/alpha! per enumerated multi-index alpha.
    neg_inv_multiindex_factorials: Vec<T>,
    /// k! for k = 0..=2*max_order; entries that overflow the scalar type are
    /// stored non-finite and reported as unavailable.
    factorials: Vec<T>,
    /// Per multi-index alpha, the sorted positions of every beta with
    /// beta >= alpha componentwise.
    upper_mapping_index: Vec<Vec<usize>>,
    /// Dense (n x n) table of prod_d C(beta_d, alpha_d), row-major in the
    /// dominator position.
    multiindex_combination: Vec<T>,
    /// Inverse of the enumeration: multi-index tuple to position.
    position_index: HashMap<Vec<usize>, usize>,
}

impl<T> MultiIndexTable<T>
where
    T: Float,
{
    /// Build the table for a given dimension and maximum order.
    ///
    /// # Arguments
    /// * `dim` - Number of spatial dimensions, at least one.
    /// * `max_order` - Largest expansion order any bound expansion may reach.
    pub fn new(dim: usize, max_order: usize) -> Result<Self, ExpansionError> {
        if dim == 0 {
            return Err(ExpansionError::InvalidDimension);
        }

        let list_total_num_coeffs: Vec<usize> =
            (0..=max_order).map(|p| binomial(p + dim, dim)).collect();
        let total = list_total_num_coeffs[max_order];

        let mut factorials = Vec::with_capacity(2 * max_order + 1);
        let mut acc = T::one();
        factorials.push(acc);
        for k in 1..=2 * max_order {
            acc = acc * T::from(k).unwrap();
            factorials.push(acc);
        }

        // Enumerate multi-indices with the head/tail axis-incremental
        // recurrence; each index of degree k is produced from one of degree
        // k-1 by bumping a single axis, which also yields the signed inverse
        // factorials incrementally.
        let mut multiindex_mapping: Vec<Vec<usize>> = Vec::with_capacity(total);
        multiindex_mapping.push(vec![0; dim]);
        let mut inv_multiindex_factorials = Vec::with_capacity(total);
        let mut neg_inv_multiindex_factorials = Vec::with_capacity(total);
        inv_multiindex_factorials.push(T::one());
        neg_inv_multiindex_factorials.push(T::one());

        let mut heads = vec![0usize; dim];
        let mut t = 1;
        let mut tail = 1;
        for _ in 1..=max_order {
            for i in 0..dim {
                let head = heads[i];
                heads[i] = t;
                for j in head..tail {
                    let mut mapping = multiindex_mapping[j].clone();
                    mapping[i] += 1;
                    let denom = T::from(mapping[i]).unwrap();
                    inv_multiindex_factorials.push(inv_multiindex_factorials[j] / denom);
                    neg_inv_multiindex_factorials
                        .push(-neg_inv_multiindex_factorials[j] / denom);
                    multiindex_mapping.push(mapping);
                    t += 1;
                }
            }
            tail = t;
        }
        debug_assert_eq!(multiindex_mapping.len(), total);

        let position_index: HashMap<Vec<usize>, usize> = multiindex_mapping
            .iter()
            .enumerate()
            .map(|(pos, mapping)| (mapping.clone(), pos))
            .collect();

        // Quadratic dominator scan; also fills the multichoose table.
        let mut upper_mapping_index = Vec::with_capacity(total);
        let mut multiindex_combination = vec![T::zero(); total * total];
        for (alpha_pos, alpha) in multiindex_mapping.iter().enumerate() {
            let mut uppers = Vec::new();
            for (beta_pos, beta) in multiindex_mapping.iter().enumerate() {
                if beta.iter().zip(alpha.iter()).all(|(b, a)| b >= a) {
                    uppers.push(beta_pos);
                }
                let mut combination = T::one();
                for d in 0..dim {
                    combination = combination * T::from(binomial(beta[d], alpha[d])).unwrap();
                }
                multiindex_combination[beta_pos * total + alpha_pos] = combination;
            }
            upper_mapping_index.push(uppers);
        }

        Ok(Self {
            dim,
            max_order,
            list_total_num_coeffs,
            multiindex_mapping,
            inv_multiindex_factorials,
            neg_inv_multiindex_factorials,
            factorials,
            upper_mapping_index,
            multiindex_combination,
            position_index,
        })
    }

    /// Number of spatial dimensions.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Maximum order this table was built for.
    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Number of multi-indices of order <= `order`, equal to
    /// C(order + dim, dim).
    ///
    /// # Panics
    /// If `order` exceeds the maximum order of the table.
    pub fn total_num_coeffs(&self, order: usize) -> usize {
        self.list_total_num_coeffs[order]
    }

    /// Number of multi-indices of the full table, C(max_order + dim, dim).
    pub fn max_total_num_coeffs(&self) -> usize {
        self.list_total_num_coeffs[self.max_order]
    }

    /// The multi-index at enumeration position `pos`.
    pub fn multiindex(&self, pos: usize) -> &[usize] {
        &self.multiindex_mapping[pos]
    }

    /// Enumeration position of a multi-index tuple, if it is within the
    /// table's maximum order.
    pub fn multiindex_position(&self, multiindex: &[usize]) -> Option<usize> {
        self.position_index.get(multiindex).copied()
    }

    /// 1/alpha! per enumerated multi-index.
    pub fn inv_multiindex_factorials(&self) -> &[T] {
        &self.inv_multiindex_factorials
    }

    /// (-1)^|alpha|/alpha! per enumerated multi-index.
    pub fn neg_inv_multiindex_factorials(&self) -> &[T] {
        &self.neg_inv_multiindex_factorials
    }

    /// k!, or `None` when `k` is beyond the precomputed range or the value
    /// overflowed the scalar type.
    pub fn factorial(&self, k: usize) -> Option<T> {
        self.factorials.get(k).copied().filter(|f| f.is_finite())
    }

    /// Sorted positions of every multi-index dominating the one at `pos`
    /// componentwise (the index itself included).
    pub fn upper_mapping(&self, pos: usize) -> &[usize] {
        &self.upper_mapping_index[pos]
    }

    /// prod_d C(beta_d, alpha_d) for the multi-indices at positions
    /// `beta_pos` and `alpha_pos`; zero when beta does not dominate alpha.
    pub fn n_multichoose_k_by_pos(&self, beta_pos: usize, alpha_pos: usize) -> T {
        self.multiindex_combination[beta_pos * self.max_total_num_coeffs() + alpha_pos]
    }

    /// Evaluate all monomials `offset^alpha` of degree <= `order` into `out`,
    /// in enumeration order.
    ///
    /// Each monomial is built from a lower-degree one by a single
    /// multiplication, walking the same head/tail cursors that produced the
    /// enumeration, so the cost is O(total_num_coeffs) multiplications.
    ///
    /// # Arguments
    /// * `offset` - Normalized coordinate offset, one entry per axis.
    /// * `order` - Maximum total degree to evaluate.
    /// * `out` - Output slice, at least `total_num_coeffs(order)` long.
    pub fn monomials(&self, offset: &[T], order: usize, out: &mut [T]) {
        debug_assert_eq!(offset.len(), self.dim);
        let mut heads = vec![0usize; self.dim];
        out[0] = T::one();
        let mut t = 1;
        let mut tail = 1;
        for _ in 1..=order {
            for i in 0..self.dim {
                let head = heads[i];
                heads[i] = t;
                for j in head..tail {
                    out[t] = out[j] * offset[i];
                    t += 1;
                }
            }
            tail = t;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(10, 3), 120);
        assert_eq!(binomial(3, 5), 0);
    }

    #[test]
    fn test_enumeration_counts() {
        for dim in 1..=4 {
            for max_order in 0..=6 {
                let table = MultiIndexTable::<f64>::new(dim, max_order).unwrap();
                for p in 0..=max_order {
                    assert_eq!(table.total_num_coeffs(p), binomial(p + dim, dim));
                }
                assert_eq!(
                    table.max_total_num_coeffs(),
                    binomial(max_order + dim, dim)
                );

                // Enumerated tuples are distinct and graded: every index at a
                // position below total_num_coeffs(p) has order <= p.
                let n = table.max_total_num_coeffs();
                let mut seen = HashSet::new();
                for pos in 0..n {
                    let mapping = table.multiindex(pos).to_vec();
                    assert_eq!(mapping.len(), dim);
                    assert!(mapping.iter().sum::<usize>() <= max_order);
                    assert!(seen.insert(mapping));
                }
                for p in 0..=max_order {
                    for pos in 0..table.total_num_coeffs(p) {
                        assert!(table.multiindex(pos).iter().sum::<usize>() <= p);
                    }
                }
            }
        }
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(MultiIndexTable::<f64>::new(0, 3).is_err());
    }

    #[test]
    fn test_inverse_factorials() {
        let table = MultiIndexTable::<f64>::new(2, 4).unwrap();
        let inv = table.inv_multiindex_factorials();
        let neg_inv = table.neg_inv_multiindex_factorials();
        for pos in 0..table.max_total_num_coeffs() {
            let mapping = table.multiindex(pos);
            let factorial: f64 = mapping
                .iter()
                .map(|&m| (1..=m).product::<usize>() as f64)
                .product();
            let order: usize = mapping.iter().sum();
            assert_relative_eq!(inv[pos], 1.0 / factorial, max_relative = 1e-14);
            let sign = if order % 2 == 0 { 1.0 } else { -1.0 };
            assert_relative_eq!(neg_inv[pos], sign / factorial, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_factorial_table() {
        let table = MultiIndexTable::<f64>::new(3, 5).unwrap();
        assert_eq!(table.factorial(0), Some(1.0));
        assert_eq!(table.factorial(5), Some(120.0));
        assert_eq!(table.factorial(10), Some(3628800.0));
        assert_eq!(table.factorial(11), None);
    }

    #[test]
    fn test_upper_mapping() {
        let table = MultiIndexTable::<f64>::new(2, 4).unwrap();
        for pos in 0..table.max_total_num_coeffs() {
            let alpha = table.multiindex(pos);
            let uppers = table.upper_mapping(pos);

            // Sorted, self-inclusive, and actually dominating.
            assert!(uppers.windows(2).all(|w| w[0] < w[1]));
            assert!(uppers.contains(&pos));
            let upper_set: HashSet<usize> = uppers.iter().copied().collect();
            for beta_pos in 0..table.max_total_num_coeffs() {
                let beta = table.multiindex(beta_pos);
                let dominates = beta.iter().zip(alpha.iter()).all(|(b, a)| b >= a);
                assert_eq!(upper_set.contains(&beta_pos), dominates);
            }
        }
    }

    #[test]
    fn test_multichoose() {
        let table = MultiIndexTable::<f64>::new(2, 3).unwrap();
        let beta_pos = table.multiindex_position(&[2, 1]).unwrap();
        let alpha_pos = table.multiindex_position(&[1, 1]).unwrap();
        // C(2,1) * C(1,1) = 2
        assert_relative_eq!(table.n_multichoose_k_by_pos(beta_pos, alpha_pos), 2.0);
        // Non-dominating pair evaluates to zero.
        let gamma_pos = table.multiindex_position(&[0, 2]).unwrap();
        assert_relative_eq!(table.n_multichoose_k_by_pos(beta_pos, gamma_pos), 0.0);
    }

    #[test]
    fn test_multiindex_position_round_trip() {
        let table = MultiIndexTable::<f64>::new(3, 4).unwrap();
        for pos in 0..table.max_total_num_coeffs() {
            let mapping = table.multiindex(pos).to_vec();
            assert_eq!(table.multiindex_position(&mapping), Some(pos));
        }
        assert_eq!(table.multiindex_position(&[5, 0, 0]), None);
    }

    #[test]
    fn test_monomials_match_direct_powers() {
        let table = MultiIndexTable::<f64>::new(3, 5).unwrap();
        let offset = [0.3, -1.7, 0.9];
        let mut values = vec![0.0; table.max_total_num_coeffs()];
        table.monomials(&offset, 5, &mut values);
        for pos in 0..table.max_total_num_coeffs() {
            let mapping = table.multiindex(pos);
            let expected: f64 = mapping
                .iter()
                .zip(offset.iter())
                .map(|(&m, &x)| x.powi(m as i32))
                .product();
            assert_relative_eq!(values[pos], expected, max_relative = 1e-13);
        }
    }
}
