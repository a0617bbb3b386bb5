//! # trilattice
//!
//! Vanilla option pricing on a recombining trinomial lattice, with a single
//! discrete cash dividend, pruning of low-probability branches and American
//! early exercise, checked against the Black-Scholes closed form.
//!
//! This crate is a **façade** that re-exports the public items of the
//! workspace crates. Application code should depend on this crate rather
//! than the individual `tl-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use trilattice::prelude::*;
//!
//! let pricing_date: Date = "2025-01-15".parse()?;
//! let market = MarketEnvironment::new(0.05, 0.20, 100.0)?
//!     .with_dividend(2.0, "2025-07-01".parse()?)?;
//! let put = OptionContract::american(OptionType::Put, 100.0, "2026-01-15".parse()?)?;
//!
//! let engine = TrinomialEngine::new(market, pricing_date, LatticeSettings::new(200, 1e-9));
//! let npv = put.price(&engine)?.npv;
//! assert!(npv > put.payoff(100.0));
//! # Ok::<(), trilattice::core::errors::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use tl_core as core;

/// Dates and the Actual/365 (Fixed) day counter.
pub use tl_time as time;

/// Normal distribution and comparison helpers.
pub use tl_math as math;

/// Market snapshot and cash dividends.
pub use tl_market as market;

/// Option contracts, payoffs and the pricing-engine seam.
pub use tl_instruments as instruments;

/// The trinomial lattice.
pub use tl_methods as methods;

/// Pricing engines, lattice Greeks and convergence studies.
pub use tl_pricingengines as pricingengines;

/// The types most programs need.
pub mod prelude {
    pub use tl_core::errors::{Error, Result};
    pub use tl_instruments::{
        ExerciseType, OptionContract, OptionType, PricingEngine, PricingResults,
    };
    pub use tl_market::{CashDividend, MarketEnvironment};
    pub use tl_methods::{ColumnTrace, NodeAttribute, TraceVisitor, TrinomialLattice};
    pub use tl_pricingengines::{
        black_scholes, AnalyticEuropeanEngine, ConvergenceStudy, Greek, LatticeGreeks,
        LatticeSettings, TrinomialEngine,
    };
    pub use tl_time::{Actual365Fixed, Date, DayCounter};
}
