//! # tl-market
//!
//! The market inputs of a pricing run.
//!
//! A [`MarketEnvironment`] is a plain value: flat continuously-compounded
//! rate, flat volatility, spot, and an optional discrete cash dividend.
//! Sensitivity drivers never mutate one; they derive a bumped copy with the
//! `with_*` methods and build a fresh lattice from it.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Market environment snapshot.
pub mod environment;

pub use environment::{CashDividend, MarketEnvironment};
