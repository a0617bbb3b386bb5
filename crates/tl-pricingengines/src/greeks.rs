//! Finite-difference sensitivities of the lattice price.
//!
//! Every Greek reruns fresh lattices with one input perturbed; the inputs
//! held by [`LatticeGreeks`] are never mutated, so bumps cannot leak between
//! calls. Each Greek is its own `Result`, letting a sweep skip a failing
//! bump without losing the others.

use crate::trinomial_engine::LatticeSettings;
use std::fmt;
use tl_core::{errors::Result, Real};
use tl_instruments::OptionContract;
use tl_market::MarketEnvironment;
use tl_time::Date;
use tracing::debug;

/// Relative spot bump for delta and gamma.
pub const SPOT_BUMP: Real = 0.01;
/// Absolute volatility bump for vega.
pub const VOLATILITY_BUMP: Real = 0.01;
/// Absolute rate bump for rho.
pub const RATE_BUMP: Real = 0.01;
/// Maturity shift for theta, in days.
pub const THETA_DAYS: i32 = 1;

/// One of the sensitivities [`LatticeGreeks`] can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Greek {
    /// ∂V/∂S.
    Delta,
    /// ∂²V/∂S².
    Gamma,
    /// ∂V/∂σ.
    Vega,
    /// Price change per day of shorter maturity.
    Theta,
    /// ∂V/∂r.
    Rho,
}

impl Greek {
    /// All Greeks, in reporting order.
    pub const ALL: [Greek; 5] = [
        Greek::Delta,
        Greek::Gamma,
        Greek::Vega,
        Greek::Theta,
        Greek::Rho,
    ];
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Greek::Delta => "delta",
            Greek::Gamma => "gamma",
            Greek::Vega => "vega",
            Greek::Theta => "theta",
            Greek::Rho => "rho",
        };
        f.write_str(name)
    }
}

/// All five sensitivities, each computed independently.
#[derive(Debug, Clone)]
pub struct Greeks {
    /// ∂V/∂S.
    pub delta: Result<Real>,
    /// ∂²V/∂S².
    pub gamma: Result<Real>,
    /// ∂V/∂σ.
    pub vega: Result<Real>,
    /// Per-day theta.
    pub theta: Result<Real>,
    /// ∂V/∂r.
    pub rho: Result<Real>,
}

/// Sensitivity driver over one market/contract pair.
#[derive(Debug, Clone, Copy)]
pub struct LatticeGreeks {
    market: MarketEnvironment,
    option: OptionContract,
    pricing_date: Date,
    settings: LatticeSettings,
}

impl LatticeGreeks {
    /// Create a driver.
    pub fn new(
        market: MarketEnvironment,
        option: OptionContract,
        pricing_date: Date,
        settings: LatticeSettings,
    ) -> Self {
        Self {
            market,
            option,
            pricing_date,
            settings,
        }
    }

    /// Unbumped lattice price.
    pub fn price(&self) -> Result<Real> {
        self.price_with(self.market, self.option)
    }

    fn price_with(&self, market: MarketEnvironment, option: OptionContract) -> Result<Real> {
        self.settings.price(market, option, self.pricing_date)
    }

    /// Forward difference in spot: `(V(S(1+h)) − V(S)) / (hS)`.
    pub fn delta(&self) -> Result<Real> {
        let s0 = self.market.spot();
        let bumped = self.price_with(self.market.with_spot(s0 * (1.0 + SPOT_BUMP))?, self.option)?;
        let base = self.price()?;
        Ok((bumped - base) / (SPOT_BUMP * s0))
    }

    /// Central second difference in spot with bumps `±hS`.
    pub fn gamma(&self) -> Result<Real> {
        let s0 = self.market.spot();
        let up = self.price_with(self.market.with_spot(s0 * (1.0 + SPOT_BUMP))?, self.option)?;
        let down = self.price_with(self.market.with_spot(s0 * (1.0 - SPOT_BUMP))?, self.option)?;
        let base = self.price()?;
        Ok((up - 2.0 * base + down) / (SPOT_BUMP * s0).powi(2))
    }

    /// Forward difference in volatility.
    pub fn vega(&self) -> Result<Real> {
        let market = self
            .market
            .with_volatility(self.market.volatility() + VOLATILITY_BUMP)?;
        let bumped = self.price_with(market, self.option)?;
        Ok((bumped - self.price()?) / VOLATILITY_BUMP)
    }

    /// Forward difference in the risk-free rate.
    pub fn rho(&self) -> Result<Real> {
        let market = self.market.with_rate(self.market.rate() + RATE_BUMP)?;
        let bumped = self.price_with(market, self.option)?;
        Ok((bumped - self.price()?) / RATE_BUMP)
    }

    /// `(V(T − 1d) − V(T)) / 1d`: the value lost per day that passes.
    pub fn theta(&self) -> Result<Real> {
        let shorter = self.option.maturity().add_days(-THETA_DAYS)?;
        let bumped = self.price_with(self.market, self.option.with_maturity(shorter)?)?;
        Ok((bumped - self.price()?) / THETA_DAYS as Real)
    }

    /// Compute one Greek.
    pub fn compute(&self, greek: Greek) -> Result<Real> {
        let value = match greek {
            Greek::Delta => self.delta(),
            Greek::Gamma => self.gamma(),
            Greek::Vega => self.vega(),
            Greek::Theta => self.theta(),
            Greek::Rho => self.rho(),
        };
        match &value {
            Ok(v) => debug!(%greek, value = *v, "lattice greek computed"),
            Err(e) => debug!(%greek, error = %e, "lattice greek failed"),
        }
        value
    }

    /// All five Greeks.
    pub fn all(&self) -> Greeks {
        Greeks {
            delta: self.compute(Greek::Delta),
            gamma: self.compute(Greek::Gamma),
            vega: self.compute(Greek::Vega),
            theta: self.compute(Greek::Theta),
            rho: self.compute(Greek::Rho),
        }
    }

    /// `greek` recomputed at each spot in `spots`, e.g. to chart delta
    /// across moneyness. Failures are kept per point.
    pub fn profile<I>(&self, greek: Greek, spots: I) -> Vec<(Real, Result<Real>)>
    where
        I: IntoIterator<Item = Real>,
    {
        spots
            .into_iter()
            .map(|spot| {
                let value = self
                    .market
                    .with_spot(spot)
                    .and_then(|market| Self { market, ..*self }.compute(greek));
                (spot, value)
            })
            .collect()
    }
}
