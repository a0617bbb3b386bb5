//! # tl-instruments
//!
//! Vanilla option contracts: payoff, exercise style, and the
//! [`PricingEngine`] trait every pricer in the workspace implements.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use exercise::ExerciseType;
pub use instrument::{PricingEngine, PricingResults};
pub use option::OptionContract;
pub use payoff::{OptionType, Payoff, PlainVanillaPayoff};
