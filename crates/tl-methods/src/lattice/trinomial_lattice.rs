//! Recombining trinomial lattice with discrete cash dividends.
//!
//! The lattice is grown forward one column at a time. The mid successor of
//! the current root is placed at its forward price; every other node of the
//! column finds its mid successor by walking the sibling chain of the next
//! column until a level whose recombination band contains its forward is
//! reached, creating levels on the way if needed. Transition probabilities
//! match the conditional mean and variance of the next-step price, and the
//! reachability of each node is pushed forward as columns are built.
//!
//! Nodes whose reachability is at or below the pruning threshold skip
//! calibration and follow a single mid branch, which bounds the width of the
//! lattice in the far tails.
//!
//! Valuation is a backward sweep from the last column to the root: each node
//! is valued once from its already-valued successors, so stack depth does
//! not grow with the step count.

use super::model::ModelParameters;
use super::node::{Node, NodeId};
use super::trace::{NodeAttribute, TraceVisitor};
use tl_core::{
    ensure,
    errors::{Error, Result},
    Probability, Real, Size,
};
use tl_instruments::OptionContract;
use tl_market::MarketEnvironment;
use tl_math::{close, EPSILON};
use tl_time::Date;
use tracing::{debug, trace, warn};

/// Expected column width, in nodes, of a pruned lattice.
const PRUNED_WIDTH_HINT: usize = 64;

/// Successors resolved for one node.
#[derive(Debug, Clone, Copy)]
struct Block {
    mid: NodeId,
    up: Option<NodeId>,
    down: Option<NodeId>,
}

/// A trinomial lattice for one pricing request.
///
/// Owns every node in an append-only arena. The graph is dropped wholesale
/// with the lattice.
#[derive(Debug, Clone)]
pub struct TrinomialLattice {
    market: MarketEnvironment,
    option: OptionContract,
    model: ModelParameters,
    prune_threshold: Probability,
    nodes: Vec<Node>,
    root: NodeId,
    column_mids: Vec<NodeId>,
    failed: Option<Error>,
}

impl TrinomialLattice {
    /// Set up a lattice with the root at spot.
    ///
    /// `prune_threshold` is the reachability at or below which a node is
    /// collapsed to its mid branch; `0.0` disables pruning.
    ///
    /// # Errors
    /// `Configuration` for an unusable time discretization (see
    /// [`ModelParameters::new`]); `Precondition` if the threshold is not in
    /// `[0, 1)`.
    pub fn new(
        market: MarketEnvironment,
        option: OptionContract,
        pricing_date: Date,
        steps: Size,
        prune_threshold: Probability,
    ) -> Result<Self> {
        let model = ModelParameters::from_inputs(&market, &option, pricing_date, steps)?;
        ensure!(
            (0.0..1.0).contains(&prune_threshold),
            "pruning threshold must be in [0, 1), got {prune_threshold}"
        );
        let mut root = Node::new(market.spot(), 0, &model);
        root.p_total = 1.0;
        let mut nodes = Vec::with_capacity(Self::capacity_hint(steps, prune_threshold));
        nodes.push(root);
        Ok(Self {
            market,
            option,
            model,
            prune_threshold,
            nodes,
            root: 0,
            column_mids: vec![0],
            failed: None,
        })
    }

    fn capacity_hint(steps: Size, prune_threshold: Probability) -> usize {
        let columns = steps + 1;
        if prune_threshold > 0.0 {
            // Pruned columns stop widening once the tails fall below the
            // threshold; let the arena grow past this if they do not.
            columns.saturating_mul(PRUNED_WIDTH_HINT).min(1 << 20)
        } else {
            // Full width without pruning: (N + 1)² nodes.
            columns.saturating_mul(columns).min(1 << 22)
        }
    }

    /// Build every column, then value the root.
    ///
    /// Calling `run` again returns the memoized root value, or the error of
    /// the failed build.
    pub fn run(&mut self) -> Result<Real> {
        self.build()?;
        self.value_all()
    }

    /// Grow the lattice to maturity. Does nothing if already built.
    ///
    /// A failed build is final: the partial lattice is kept for inspection
    /// and every later call returns the first error without touching it.
    pub fn build(&mut self) -> Result<()> {
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }
        if self.is_built() {
            return Ok(());
        }
        debug!(
            steps = self.model.steps(),
            delta_t = self.model.delta_t(),
            alpha = self.model.alpha(),
            prune_threshold = self.prune_threshold,
            option = %self.option,
            "building trinomial lattice"
        );
        for step in 1..=self.model.steps() {
            if let Err(e) = self.build_column(step) {
                warn!(step, error = %e, "lattice construction aborted");
                self.failed = Some(e.clone());
                return Err(e);
            }
        }
        debug!(nodes = self.nodes.len(), "lattice built");
        Ok(())
    }

    /// Build column `step` from the blocks of column `step − 1`.
    fn build_column(&mut self, step: Size) -> Result<()> {
        let dividend = self.dividend_for_step(step);
        let root = self.root;

        let forward = self.checked_forward(root, dividend)?;
        let mid = self.push_node(forward, step);
        let root_block = self.build_block(root, mid, dividend)?;

        let mut inner = root;
        let mut block = root_block;
        while let Some(outer) = self.nodes[inner].up {
            block = self.build_block(outer, block.up.unwrap_or(block.mid), dividend)?;
            inner = outer;
        }

        let mut inner = root;
        let mut block = root_block;
        while let Some(outer) = self.nodes[inner].down {
            block = self.build_block(outer, block.down.unwrap_or(block.mid), dividend)?;
            inner = outer;
        }

        self.check_column(step, root_block.mid)?;
        trace!(
            step,
            dividend,
            width = self.column_from(root_block.mid).len(),
            "column built"
        );
        self.root = root_block.mid;
        self.column_mids.push(root_block.mid);
        Ok(())
    }

    /// Cash dividend paid during the step that builds column `step`.
    fn dividend_for_step(&self, step: Size) -> Real {
        match self.market.dividend() {
            Some(d) if self.model.step_contains(step, d.ex_date) => d.amount,
            _ => 0.0,
        }
    }

    fn checked_forward(&self, id: NodeId, dividend: Real) -> Result<Real> {
        let node = &self.nodes[id];
        let forward = node.forward_mid(&self.model, dividend);
        if !(forward.is_finite() && forward > 0.0) {
            return Err(Error::Calibration {
                step: node.step,
                spot: node.spot,
                detail: format!(
                    "forward {forward:.6} after dividend {dividend} cannot be placed on the lattice"
                ),
            });
        }
        Ok(forward)
    }

    fn push_node(&mut self, spot: Real, step: Size) -> NodeId {
        self.nodes.push(Node::new(spot, step, &self.model));
        self.nodes.len() - 1
    }

    /// Resolve the successors of `id`, calibrate its transition
    /// probabilities and push its reachability forward.
    fn build_block(&mut self, id: NodeId, start: NodeId, dividend: Real) -> Result<Block> {
        let forward = self.checked_forward(id, dividend)?;
        let alpha = self.model.alpha();
        let next_step = self.nodes[id].step + 1;
        let pruned = self.nodes[id].p_total <= self.prune_threshold;

        let mid = self.find_mid(start, forward);
        let (up, down) = if pruned {
            (None, None)
        } else {
            let up = match self.nodes[mid].up {
                Some(up) => up,
                None => {
                    let up = self.push_node(forward * alpha, next_step);
                    self.nodes[up].down = Some(mid);
                    self.nodes[mid].up = Some(up);
                    up
                }
            };
            let down = match self.nodes[mid].down {
                Some(down) => down,
                None => {
                    let down = self.push_node(forward / alpha, next_step);
                    self.nodes[down].up = Some(mid);
                    self.nodes[mid].down = Some(down);
                    down
                }
            };
            (Some(up), Some(down))
        };

        let mid_spot = self.nodes[mid].spot;
        let node = &mut self.nodes[id];
        node.n_mid = Some(mid);
        node.n_up = up;
        node.n_down = down;
        if pruned {
            node.collapse();
        } else {
            node.calibrate(mid_spot, forward, alpha)?;
        }

        let (p_down, p_mid, p_up) = node.probabilities();
        let reach = node.p_total;
        self.nodes[mid].p_total += p_mid * reach;
        if let (Some(up), Some(down)) = (up, down) {
            self.nodes[up].p_total += p_up * reach;
            self.nodes[down].p_total += p_down * reach;
        }
        Ok(Block { mid, up, down })
    }

    /// Walk the sibling chain from `start` to the level whose band contains
    /// `forward`, creating levels as needed.
    fn find_mid(&mut self, start: NodeId, forward: Real) -> NodeId {
        let alpha = self.model.alpha();
        let mut current = start;
        if self.nodes[current].is_close(forward, alpha) {
            return current;
        }
        if forward > self.nodes[start].spot {
            // Bands are contiguous, so the first level whose upper edge
            // exceeds the forward is the match.
            loop {
                current = self.move_up(current);
                if forward < self.nodes[current].band_high(alpha) {
                    return current;
                }
            }
        } else {
            loop {
                current = self.move_down(current);
                if forward > self.nodes[current].band_low(alpha) {
                    return current;
                }
            }
        }
    }

    /// The level above `id` in the same column, created if absent.
    fn move_up(&mut self, id: NodeId) -> NodeId {
        if let Some(up) = self.nodes[id].up {
            return up;
        }
        let (spot, step) = (self.nodes[id].spot, self.nodes[id].step);
        let up = self.push_node(spot * self.model.alpha(), step);
        self.nodes[up].down = Some(id);
        self.nodes[id].up = Some(up);
        up
    }

    /// The level below `id` in the same column, created if absent.
    fn move_down(&mut self, id: NodeId) -> NodeId {
        if let Some(down) = self.nodes[id].down {
            return down;
        }
        let (spot, step) = (self.nodes[id].spot, self.nodes[id].step);
        let down = self.push_node(spot / self.model.alpha(), step);
        self.nodes[down].up = Some(id);
        self.nodes[id].down = Some(down);
        down
    }

    /// Column reachability must sum to one.
    fn check_column(&self, step: Size, mid: NodeId) -> Result<()> {
        let total: Probability = self
            .column_from(mid)
            .iter()
            .map(|&(_, id)| self.nodes[id].p_total)
            .sum();
        if !close(total, 1.0, EPSILON) {
            warn!(step, total, "column reachability does not sum to one");
            return Err(Error::Consistency { step, total });
        }
        Ok(())
    }

    /// Value every node from the last column back to the root.
    fn value_all(&mut self) -> Result<Real> {
        if let Some(v) = self.nodes[0].value {
            return Ok(v);
        }
        for step in (0..self.column_mids.len()).rev() {
            for (_, id) in self.column(step) {
                self.value_node(id)?;
            }
        }
        let price = self.valued(0)?;
        debug!(price, nodes = self.nodes.len(), "lattice priced");
        Ok(price)
    }

    /// Memoized value of one node; successors must already be valued.
    fn value_node(&mut self, id: NodeId) -> Result<Real> {
        if let Some(v) = self.nodes[id].value {
            return Ok(v);
        }
        let node = &self.nodes[id];
        let spot = node.spot;
        let value = match node.n_mid {
            None => self.option.payoff(spot),
            Some(mid) => {
                let expectation = match (node.n_up, node.n_down) {
                    (Some(up), Some(down)) if !node.pruned => {
                        node.p_up * self.valued(up)?
                            + node.p_mid * self.valued(mid)?
                            + node.p_down * self.valued(down)?
                    }
                    _ => node.p_mid * self.valued(mid)?,
                };
                let continuation = expectation * self.model.discount();
                if self.option.exercise().is_early() {
                    continuation.max(self.option.payoff(spot))
                } else {
                    continuation
                }
            }
        };
        self.nodes[id].value = Some(value);
        Ok(value)
    }

    fn valued(&self, id: NodeId) -> Result<Real> {
        self.nodes[id].value.ok_or_else(|| {
            Error::Runtime(format!(
                "node {id} in column {} valued before its successors",
                self.nodes[id].step
            ))
        })
    }

    // ── Inspection ─────────────────────────────────────────────────────────

    /// Whether every column has been built.
    pub fn is_built(&self) -> bool {
        self.column_mids.len() == self.model.steps() + 1
    }

    /// The discretization in use.
    pub fn model(&self) -> &ModelParameters {
        &self.model
    }

    /// The market snapshot in use.
    pub fn market(&self) -> &MarketEnvironment {
        &self.market
    }

    /// The contract being priced.
    pub fn option(&self) -> &OptionContract {
        &self.option
    }

    /// Pruning threshold.
    pub fn prune_threshold(&self) -> Probability {
        self.prune_threshold
    }

    /// Number of nodes created so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The first root, at spot in column 0.
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Mid node of column `step`, if built.
    pub fn column_mid(&self, step: Size) -> Option<NodeId> {
        self.column_mids.get(step).copied()
    }

    /// Nodes of column `step` as `(row, id)`, top row first. Empty if the
    /// column is not built yet.
    pub fn column(&self, step: Size) -> Vec<(isize, NodeId)> {
        self.column_mid(step)
            .map(|mid| self.column_from(mid))
            .unwrap_or_default()
    }

    fn column_from(&self, mid: NodeId) -> Vec<(isize, NodeId)> {
        let mut top = mid;
        let mut row = 0isize;
        while let Some(up) = self.nodes[top].up {
            top = up;
            row += 1;
        }
        let mut out = Vec::new();
        let mut current = Some(top);
        while let Some(id) = current {
            out.push((row, id));
            row -= 1;
            current = self.nodes[id].down;
        }
        out
    }

    /// Sum of reachability probabilities of column `step`.
    pub fn column_probability(&self, step: Size) -> Probability {
        self.column(step)
            .iter()
            .map(|&(_, id)| self.nodes[id].p_total)
            .sum()
    }

    /// Visit `attribute` of every node, column by column, top row first.
    pub fn trace<V: TraceVisitor + ?Sized>(&self, attribute: NodeAttribute, visitor: &mut V) {
        for step in 0..self.column_mids.len() {
            for (row, id) in self.column(step) {
                if let Some(value) = attribute.read(&self.nodes[id]) {
                    visitor.visit(step, row, value);
                }
            }
        }
    }
}
