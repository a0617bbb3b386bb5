//! # tl-pricingengines
//!
//! Pricing engines and the drivers built on them.
//!
//! ## Engines
//!
//! - [`AnalyticEuropeanEngine`] — Black-Scholes closed form for European options
//! - [`TrinomialEngine`] — recombining trinomial lattice, European or American
//!
//! ## Drivers
//!
//! - [`LatticeGreeks`] — finite-difference sensitivities from bumped lattices
//! - [`ConvergenceStudy`] — lattice versus closed form across steps and strikes

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod convergence;
pub mod greeks;
pub mod trinomial_engine;

pub use analytic_european_engine::{black_scholes, AnalyticEuropeanEngine};
pub use convergence::{ConvergenceStudy, StepConvergence, StrikeConvergence};
pub use greeks::{Greek, Greeks, LatticeGreeks};
pub use trinomial_engine::{LatticeSettings, TrinomialEngine};
