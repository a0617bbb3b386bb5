//! Probability distributions.
//!
//! Only the standard normal is needed: the Black-Scholes comparator reads
//! `N(·)` and `φ(·)` from here.

pub mod normal;

pub use normal::{normal_cdf, normal_pdf};
