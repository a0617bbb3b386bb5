//! Lattice-versus-closed-form convergence studies.
//!
//! Two sweeps over one market/contract pair: the step count at fixed strike,
//! and the strike at a fixed step count. The closed form ignores the cash
//! dividend, so the studies are meaningful for dividend-free markets.

use crate::analytic_european_engine::black_scholes;
use tl_core::{errors::Result, Probability, Real, Size};
use tl_instruments::OptionContract;
use tl_market::MarketEnvironment;
use tl_methods::TrinomialLattice;
use tl_time::{Actual365Fixed, Date, DayCounter};
use tracing::{debug, trace};

/// One row of [`ConvergenceStudy::convergence_by_steps`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConvergence {
    /// Number of lattice steps.
    pub steps: Size,
    /// Lattice price.
    pub lattice: Real,
    /// Closed-form price.
    pub black_scholes: Real,
    /// `(lattice − black_scholes) · steps`; bounded when the error is O(1/N).
    pub scaled_error: Real,
}

/// One row of [`ConvergenceStudy::convergence_by_strike`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeConvergence {
    /// Strike of this row.
    pub strike: Real,
    /// Lattice price.
    pub lattice: Real,
    /// Closed-form price.
    pub black_scholes: Real,
    /// `lattice − black_scholes`.
    pub difference: Real,
    /// Lattice price change from the previous strike; `None` on the first row.
    pub lattice_slope: Option<Real>,
    /// Closed-form price change from the previous strike; `None` on the
    /// first row.
    pub black_scholes_slope: Option<Real>,
}

/// Convergence driver.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceStudy {
    market: MarketEnvironment,
    option: OptionContract,
    pricing_date: Date,
    prune_threshold: Probability,
}

impl ConvergenceStudy {
    /// Create a study; `prune_threshold` applies to every lattice it runs.
    pub fn new(
        market: MarketEnvironment,
        option: OptionContract,
        pricing_date: Date,
        prune_threshold: Probability,
    ) -> Self {
        Self {
            market,
            option,
            pricing_date,
            prune_threshold,
        }
    }

    fn lattice_price(&self, option: OptionContract, steps: Size) -> Result<Real> {
        TrinomialLattice::new(
            self.market,
            option,
            self.pricing_date,
            steps,
            self.prune_threshold,
        )?
        .run()
    }

    fn closed_form(&self, option: &OptionContract) -> Real {
        let t = Actual365Fixed.year_fraction(self.pricing_date, option.maturity());
        black_scholes(
            option.option_type(),
            self.market.spot(),
            option.strike(),
            self.market.rate(),
            self.market.volatility(),
            t,
        )
        .0
    }

    /// Price with `1..=max_steps` steps against the closed form.
    pub fn convergence_by_steps(&self, max_steps: Size) -> Result<Vec<StepConvergence>> {
        let bs = self.closed_form(&self.option);
        let rows = (1..=max_steps)
            .map(|steps| {
                let lattice = self.lattice_price(self.option, steps)?;
                trace!(steps, lattice, bs, "convergence point");
                Ok(StepConvergence {
                    steps,
                    lattice,
                    black_scholes: bs,
                    scaled_error: (lattice - bs) * steps as Real,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(max_steps, "step convergence study done");
        Ok(rows)
    }

    /// Sweep integer strikes from `K − ⌊K/10⌋` to `K + ⌊K/10⌋`, with `K`
    /// the contract strike truncated to an integer.
    pub fn convergence_by_strike(&self, steps: Size) -> Result<Vec<StrikeConvergence>> {
        let center = self.option.strike().trunc() as i64;
        let half_width = (center as Real * 0.10).trunc() as i64;

        let mut rows: Vec<StrikeConvergence> = Vec::new();
        for k in (center - half_width)..=(center + half_width) {
            let option = self.option.with_strike(k as Real)?;
            let lattice = self.lattice_price(option, steps)?;
            let bs = self.closed_form(&option);
            let (lattice_slope, black_scholes_slope) = match rows.last() {
                Some(prev) => (Some(lattice - prev.lattice), Some(bs - prev.black_scholes)),
                None => (None, None),
            };
            rows.push(StrikeConvergence {
                strike: k as Real,
                lattice,
                black_scholes: bs,
                difference: lattice - bs,
                lattice_slope,
                black_scholes_slope,
            });
        }
        debug!(steps, rows = rows.len(), "strike convergence study done");
        Ok(rows)
    }
}
