//! Lattice nodes.
//!
//! A [`Node`] is one price level in one column. Nodes live in the arena of a
//! [`TrinomialLattice`](super::TrinomialLattice) and refer to each other by
//! [`NodeId`]:
//!
//! * `n_down`, `n_mid`, `n_up` — successors in the next column, set when the
//!   node's outgoing block is built;
//! * `down`, `up` — neighbours one level below/above in the *same* column,
//!   used only to find recombination targets.
//!
//! Everything here is local to one node; walking the graph is the lattice's
//! job.

use super::model::ModelParameters;
use tl_core::{
    errors::{Error, Result},
    Probability, Real, Size,
};

/// Index of a node in the lattice arena.
pub type NodeId = usize;

/// One state of the trinomial lattice.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) spot: Real,
    pub(crate) step: Size,
    pub(crate) variance: Real,
    pub(crate) p_total: Probability,
    pub(crate) p_down: Probability,
    pub(crate) p_mid: Probability,
    pub(crate) p_up: Probability,
    pub(crate) n_down: Option<NodeId>,
    pub(crate) n_mid: Option<NodeId>,
    pub(crate) n_up: Option<NodeId>,
    pub(crate) down: Option<NodeId>,
    pub(crate) up: Option<NodeId>,
    pub(crate) pruned: bool,
    pub(crate) value: Option<Real>,
}

impl Node {
    /// Create an unlinked node at price `spot` in column `step`.
    pub fn new(spot: Real, step: Size, model: &ModelParameters) -> Self {
        Self {
            spot,
            step,
            variance: spot * spot * model.variance_factor(),
            p_total: 0.0,
            p_down: 0.0,
            p_mid: 0.0,
            p_up: 0.0,
            n_down: None,
            n_mid: None,
            n_up: None,
            down: None,
            up: None,
            pruned: false,
            value: None,
        }
    }

    /// Underlying price at this node.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Column index; 0 for the root.
    pub fn step(&self) -> Size {
        self.step
    }

    /// Conditional variance of the next-step price.
    pub fn variance(&self) -> Real {
        self.variance
    }

    /// Probability of reaching this node from the root.
    pub fn reach_probability(&self) -> Probability {
        self.p_total
    }

    /// Transition probabilities `(p_down, p_mid, p_up)`.
    pub fn probabilities(&self) -> (Probability, Probability, Probability) {
        (self.p_down, self.p_mid, self.p_up)
    }

    /// Whether the node was collapsed to a single mid branch.
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    /// Successors `(n_down, n_mid, n_up)`.
    pub fn successors(&self) -> (Option<NodeId>, Option<NodeId>, Option<NodeId>) {
        (self.n_down, self.n_mid, self.n_up)
    }

    /// Neighbours `(down, up)` in the same column.
    pub fn siblings(&self) -> (Option<NodeId>, Option<NodeId>) {
        (self.down, self.up)
    }

    /// Memoized option value, once the lattice has been priced.
    pub fn value(&self) -> Option<Real> {
        self.value
    }

    /// Risk-neutral expected price one step ahead, less `dividend`.
    pub fn forward_mid(&self, model: &ModelParameters, dividend: Real) -> Real {
        self.spot * model.growth() - dividend
    }

    /// `forward_mid × α`.
    pub fn forward_up(&self, model: &ModelParameters, dividend: Real) -> Real {
        self.forward_mid(model, dividend) * model.alpha()
    }

    /// `forward_mid ÷ α`.
    pub fn forward_down(&self, model: &ModelParameters, dividend: Real) -> Real {
        self.forward_mid(model, dividend) / model.alpha()
    }

    /// Lower edge of the band of prices that recombine onto this level.
    pub(crate) fn band_low(&self, alpha: Real) -> Real {
        self.spot * (1.0 + 1.0 / alpha) / 2.0
    }

    /// Upper edge of the band of prices that recombine onto this level.
    pub(crate) fn band_high(&self, alpha: Real) -> Real {
        self.spot * (1.0 + alpha) / 2.0
    }

    /// Whether `price` recombines onto this level:
    /// `S (1 + 1/α)/2 < price < S (1 + α)/2`.
    pub fn is_close(&self, price: Real, alpha: Real) -> bool {
        self.band_low(alpha) < price && price < self.band_high(alpha)
    }

    /// Match the first two moments of the next-step distribution on the
    /// levels `mid/α`, `mid`, `mid·α`.
    ///
    /// # Errors
    /// `Calibration` if any probability is negative (or not a number).
    pub(crate) fn calibrate(&mut self, mid_spot: Real, forward: Real, alpha: Real) -> Result<()> {
        let ratio = forward / mid_spot;
        let p_down = ((self.variance + forward * forward) / (mid_spot * mid_spot)
            - 1.0
            - (alpha + 1.0) * (ratio - 1.0))
            / ((1.0 - alpha) * (alpha.powi(-2) - 1.0));
        let p_up = ((ratio - 1.0) - p_down * (1.0 / alpha - 1.0)) / (alpha - 1.0);
        let p_mid = 1.0 - p_down - p_up;

        if !(p_down >= 0.0 && p_mid >= 0.0 && p_up >= 0.0) {
            return Err(Error::Calibration {
                step: self.step,
                spot: self.spot,
                detail: format!(
                    "negative transition probability: p_down={p_down:.6e}, \
                     p_mid={p_mid:.6e}, p_up={p_up:.6e} (alpha={alpha:.6})"
                ),
            });
        }
        self.p_down = p_down;
        self.p_mid = p_mid;
        self.p_up = p_up;
        Ok(())
    }

    /// Collapse to a single deterministic mid transition.
    pub(crate) fn collapse(&mut self) {
        self.pruned = true;
        self.p_down = 0.0;
        self.p_mid = 1.0;
        self.p_up = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tl_time::Date;

    fn model(steps: Size, rate: Real, vol: Real) -> ModelParameters {
        let start = Date::from_ymd(2025, 1, 15).unwrap();
        let end = Date::from_ymd(2026, 1, 15).unwrap();
        ModelParameters::new(start, end, steps, rate, vol).unwrap()
    }

    #[test]
    fn variance_matches_lognormal_step() {
        let m = model(50, 0.05, 0.2);
        let n = Node::new(100.0, 0, &m);
        let dt = m.delta_t();
        let expected = 100.0_f64.powi(2) * (2.0 * 0.05 * dt).exp() * ((0.04 * dt).exp() - 1.0);
        assert_relative_eq!(n.variance(), expected, max_relative = 1e-12);
    }

    #[test]
    fn forwards_are_alpha_apart() {
        let m = model(10, 0.05, 0.2);
        let n = Node::new(100.0, 0, &m);
        let fwd = n.forward_mid(&m, 0.0);
        assert_relative_eq!(fwd, 100.0 * (0.05 * m.delta_t()).exp(), epsilon = 1e-12);
        assert_relative_eq!(n.forward_up(&m, 0.0) / fwd, m.alpha(), epsilon = 1e-12);
        assert_relative_eq!(fwd / n.forward_down(&m, 0.0), m.alpha(), epsilon = 1e-12);
        assert_relative_eq!(n.forward_mid(&m, 2.5), fwd - 2.5, epsilon = 1e-12);
    }

    #[test]
    fn close_band_is_open_and_centered() {
        let m = model(10, 0.05, 0.2);
        let a = m.alpha();
        let n = Node::new(100.0, 3, &m);
        assert!(n.is_close(100.0, a));
        assert!(n.is_close(100.0 * (1.0 + a) / 2.0 - 1e-9, a));
        assert!(!n.is_close(100.0 * (1.0 + a) / 2.0, a));
        assert!(!n.is_close(100.0 * a, a));
        assert!(!n.is_close(100.0 / a, a));
    }

    #[test]
    fn centered_calibration_matches_moments() {
        let m = model(100, 0.05, 0.2);
        let a = m.alpha();
        let mut n = Node::new(100.0, 0, &m);
        let fwd = n.forward_mid(&m, 0.0);
        n.calibrate(fwd, fwd, a).unwrap();
        let (pd, pm, pu) = n.probabilities();
        assert_relative_eq!(pd + pm + pu, 1.0, epsilon = 1e-14);
        // mean
        let mean = pd * fwd / a + pm * fwd + pu * fwd * a;
        assert_relative_eq!(mean, fwd, max_relative = 1e-12);
        // variance
        let second = pd * (fwd / a).powi(2) + pm * fwd * fwd + pu * (fwd * a).powi(2);
        assert_relative_eq!(second - fwd * fwd, n.variance(), max_relative = 1e-8);
        assert!((pd - 1.0 / 6.0).abs() < 0.01 && (pu - 1.0 / 6.0).abs() < 0.01);
    }

    #[test]
    fn off_center_forward_tilts_probabilities() {
        let m = model(100, 0.05, 0.2);
        let a = m.alpha();
        let mut n = Node::new(100.0, 0, &m);
        let fwd = n.forward_mid(&m, 0.0);
        let mid = fwd / a.sqrt().sqrt();
        n.calibrate(mid, fwd, a).unwrap();
        let (pd, _, pu) = n.probabilities();
        assert!(pu > pd);
    }

    #[test]
    fn extreme_volatility_fails_calibration() {
        let m = model(1, 0.05, 3.0);
        let mut n = Node::new(100.0, 0, &m);
        let fwd = n.forward_mid(&m, 0.0);
        let err = n.calibrate(fwd, fwd, m.alpha()).unwrap_err();
        assert!(matches!(err, Error::Calibration { step: 0, .. }));
        assert_eq!(n.probabilities(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn collapse_keeps_only_mid() {
        let m = model(10, 0.05, 0.2);
        let mut n = Node::new(100.0, 2, &m);
        n.collapse();
        assert!(n.is_pruned());
        assert_eq!(n.probabilities(), (0.0, 1.0, 0.0));
    }
}
