//! # Series expansions for fast kernel summation
//!
//! Truncated multivariate Taylor/Hermite series for approximating sums of a
//! symmetric kernel between weighted source points and query points, the
//! building block of dual-tree fast Gauss transforms and related fast
//! summation methods \[1\], \[2\].
//!
//! The crate provides:
//! * a shared, immutable [`MultiIndexTable`] with the canonical multi-index
//!   enumeration and every scalar table the operators need,
//! * [`FarFieldExpansion`] (outgoing) and [`LocalExpansion`] (incoming)
//!   expansions over a pluggable kernel derivative policy,
//! * additive translation operators (far-to-far, far-to-local,
//!   local-to-local),
//! * an order selector inverting a closed-form error bound, so a traversal
//!   can decide whether an expansion-based approximation is admissible.
//!
//! ## References
//! \[1\] Greengard, L., & Strain, J. (1991). The fast Gauss transform. SIAM
//! Journal on Scientific and Statistical Computing, 12(1), 79-94.
//!
//! \[2\] Lee, D., Gray, A., & Moore, A. (2005). Dual-tree fast Gauss
//! transforms. Advances in Neural Information Processing Systems, 18.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod domain;
pub mod expansion;
pub mod helpers;
pub mod kernel;
pub mod traits;

// Public API
#[doc(inline)]
pub use expansion::table::MultiIndexTable;
#[doc(inline)]
pub use expansion::types::FarFieldExpansion;
#[doc(inline)]
pub use expansion::types::LocalExpansion;
#[doc(inline)]
pub use domain::Domain;
#[doc(inline)]
pub use kernel::epanechnikov::EpanechnikovKernel;
#[doc(inline)]
pub use kernel::gaussian::GaussianKernel;
#[doc(inline)]
pub use traits::expansion::Expansion;
#[doc(inline)]
pub use traits::types::ExpansionError;
