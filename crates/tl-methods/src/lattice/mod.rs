//! Trinomial lattice for vanilla options on a dividend-paying underlying.
//!
//! # Overview
//!
//! * [`ModelParameters`] — step length, spacing multiplier, per-step growth
//!   and discount factors, dividend windows
//! * [`Node`] — one price level of one column, with its forwards and
//!   transition probabilities
//! * [`TrinomialLattice`] — forward construction and backward valuation
//! * [`NodeAttribute`] / [`TraceVisitor`] — inspection of a built lattice

pub mod model;
pub mod node;
pub mod trace;
pub mod trinomial_lattice;

pub use model::ModelParameters;
pub use node::{Node, NodeId};
pub use trace::{ColumnTrace, NodeAttribute, TracePoint, TraceVisitor};
pub use trinomial_lattice::TrinomialLattice;
