//! Trinomial lattice engine.
//!
//! Wraps [`TrinomialLattice`] behind the [`PricingEngine`] seam. Each call
//! builds a fresh lattice, so one engine can price many contracts and
//! several engines can run on different threads.

use tl_core::{errors::Result, Probability, Real, Size};
use tl_instruments::{OptionContract, PricingEngine, PricingResults};
use tl_market::MarketEnvironment;
use tl_methods::TrinomialLattice;
use tl_time::Date;
use tracing::debug;

/// Discretization settings of a lattice run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeSettings {
    /// Number of time steps `N`.
    pub steps: Size,
    /// Reachability at or below which nodes are collapsed; `0.0` disables
    /// pruning.
    pub prune_threshold: Probability,
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            steps: 100,
            prune_threshold: 0.0,
        }
    }
}

impl LatticeSettings {
    /// Settings with `steps` steps and the given pruning threshold.
    pub fn new(steps: Size, prune_threshold: Probability) -> Self {
        Self {
            steps,
            prune_threshold,
        }
    }

    /// An unbuilt lattice for these settings.
    pub fn lattice(
        &self,
        market: MarketEnvironment,
        option: OptionContract,
        pricing_date: Date,
    ) -> Result<TrinomialLattice> {
        TrinomialLattice::new(
            market,
            option,
            pricing_date,
            self.steps,
            self.prune_threshold,
        )
    }

    /// Build and value a fresh lattice.
    pub fn price(
        &self,
        market: MarketEnvironment,
        option: OptionContract,
        pricing_date: Date,
    ) -> Result<Real> {
        self.lattice(market, option, pricing_date)?.run()
    }
}

/// Lattice engine for European and American vanilla options with an
/// optional discrete cash dividend.
///
/// Besides the NPV, results carry the lattice diagnostics `"steps"`,
/// `"alpha"` and `"nodes"`.
#[derive(Debug, Clone, Copy)]
pub struct TrinomialEngine {
    market: MarketEnvironment,
    pricing_date: Date,
    settings: LatticeSettings,
}

impl TrinomialEngine {
    /// Create a new engine.
    pub fn new(market: MarketEnvironment, pricing_date: Date, settings: LatticeSettings) -> Self {
        Self {
            market,
            pricing_date,
            settings,
        }
    }

    /// The settings in use.
    pub fn settings(&self) -> LatticeSettings {
        self.settings
    }
}

impl PricingEngine<OptionContract> for TrinomialEngine {
    fn calculate(&self, option: &OptionContract) -> Result<PricingResults> {
        let mut lattice = self.settings.lattice(self.market, *option, self.pricing_date)?;
        let npv = lattice.run()?;
        debug!(%option, npv, nodes = lattice.node_count(), "trinomial engine priced");

        Ok(PricingResults::from_npv(npv)
            .with_result("steps", self.settings.steps as Real)
            .with_result("alpha", lattice.model().alpha())
            .with_result("nodes", lattice.node_count() as Real))
    }
}
