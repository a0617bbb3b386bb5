//! Column-by-column inspection of a built lattice.
//!
//! Tracing is a separate pass over the arena, requested per call, so a
//! lattice that is only priced never pays for it. Rows are signed offsets
//! from the column's mid node: `0` is the mid level, positive rows lie above.

use super::node::Node;
use tl_core::{Real, Size};

/// Which node attribute a trace reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeAttribute {
    /// Underlying price.
    Spot,
    /// Probability of reaching the node from the root.
    ReachProbability,
    /// Memoized option value; nodes not yet valued are skipped.
    OptionValue,
}

impl NodeAttribute {
    /// Read the attribute from a node.
    pub fn read(self, node: &Node) -> Option<Real> {
        match self {
            NodeAttribute::Spot => Some(node.spot()),
            NodeAttribute::ReachProbability => Some(node.reach_probability()),
            NodeAttribute::OptionValue => node.value(),
        }
    }
}

/// Receives one traced node at a time.
pub trait TraceVisitor {
    /// Called with the column index, the row offset and the attribute value.
    fn visit(&mut self, step: Size, row: isize, value: Real);
}

impl<F> TraceVisitor for F
where
    F: FnMut(Size, isize, Real),
{
    fn visit(&mut self, step: Size, row: isize, value: Real) {
        self(step, row, value)
    }
}

/// One traced value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    /// Column index.
    pub step: Size,
    /// Row offset from the column's mid node.
    pub row: isize,
    /// Attribute value.
    pub value: Real,
}

/// A visitor that records every point, for reporting layers that want a
/// table rather than a callback.
#[derive(Debug, Clone, Default)]
pub struct ColumnTrace {
    points: Vec<TracePoint>,
}

impl ColumnTrace {
    /// Empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded points, column by column, top row first.
    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    /// Points of a single column.
    pub fn column(&self, step: Size) -> impl Iterator<Item = &TracePoint> {
        self.points.iter().filter(move |p| p.step == step)
    }
}

impl TraceVisitor for ColumnTrace {
    fn visit(&mut self, step: Size, row: isize, value: Real) {
        self.points.push(TracePoint { step, row, value });
    }
}
