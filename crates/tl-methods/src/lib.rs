//! # tl-methods
//!
//! Numerical methods for trilattice: the recombining trinomial lattice.
//!
//! # Modules
//!
//! * [`lattice`] — lattice construction, pruning, backward induction and
//!   column-by-column inspection

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Trinomial lattice: model parameters, nodes, construction and valuation.
pub mod lattice;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{
    ColumnTrace, ModelParameters, Node, NodeAttribute, NodeId, TracePoint, TraceVisitor,
    TrinomialLattice,
};
