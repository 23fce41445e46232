//! Trait definitions for series expansions, kernels and regions.
pub mod expansion;
pub mod kernel;
pub mod region;
pub mod types;
