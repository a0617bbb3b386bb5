//! # tl-math
//!
//! Standard normal distribution functions for the closed-form pricer and
//! tolerance comparisons used by the lattice consistency checks.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Floating-point comparison with explicit tolerances.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

pub use comparison::{close, EPSILON};
pub use distributions::{normal_cdf, normal_pdf};
