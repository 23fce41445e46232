//! Kernel families shipped with the crate.
//!
//! Each family pairs a bandwidth-parametrized kernel with the derivative
//! policy that generates its expansion coefficients; further families plug in
//! through the traits in [`crate::traits::kernel`].
pub mod epanechnikov;
pub mod gaussian;
