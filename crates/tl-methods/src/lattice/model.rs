//! Time discretization of the trinomial lattice.
//!
//! The horizon from the pricing date to maturity is split into `N` equal steps
//! of length `Δt` (Actual/365 Fixed). Price levels are spaced geometrically by
//! `α = exp(σ √(3 Δt))`.

use tl_core::{
    errors::{Error, Result},
    DiscountFactor, Rate, Real, Size, Time, Volatility,
};
use tl_instruments::OptionContract;
use tl_market::MarketEnvironment;
use tl_time::{Actual365Fixed, Date, DayCounter};

/// Derived, immutable parameters of one lattice run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    pricing_date: Date,
    maturity: Date,
    steps: Size,
    delta_t: Time,
    alpha: Real,
    growth: Real,
    discount: DiscountFactor,
    variance_factor: Real,
}

impl ModelParameters {
    /// Derive the discretization for `steps` steps between `pricing_date` and
    /// `maturity`.
    ///
    /// # Errors
    /// `Configuration` if `steps` is zero, `Δt ≤ 0` (maturity not after the
    /// pricing date), or the spacing multiplier degenerates to 1.
    pub fn new(
        pricing_date: Date,
        maturity: Date,
        steps: Size,
        rate: Rate,
        volatility: Volatility,
    ) -> Result<Self> {
        if steps == 0 {
            return Err(Error::Configuration("step count must be positive".into()));
        }
        let horizon = Actual365Fixed.year_fraction(pricing_date, maturity);
        let delta_t = horizon / steps as Real;
        if !(delta_t > 0.0) {
            return Err(Error::Configuration(format!(
                "delta_t must be positive, got {delta_t} ({pricing_date} to {maturity}, {steps} steps)"
            )));
        }
        let alpha = (volatility * (3.0 * delta_t).sqrt()).exp();
        if !(alpha.is_finite() && alpha > 1.0) {
            return Err(Error::Configuration(format!(
                "lattice spacing alpha={alpha} is degenerate for vol={volatility}, delta_t={delta_t}"
            )));
        }
        let growth = (rate * delta_t).exp();
        Ok(Self {
            pricing_date,
            maturity,
            steps,
            delta_t,
            alpha,
            growth,
            discount: (-rate * delta_t).exp(),
            variance_factor: growth * growth * ((volatility * volatility * delta_t).exp() - 1.0),
        })
    }

    /// Derive the discretization from a market snapshot and a contract.
    pub fn from_inputs(
        market: &MarketEnvironment,
        option: &OptionContract,
        pricing_date: Date,
        steps: Size,
    ) -> Result<Self> {
        Self::new(
            pricing_date,
            option.maturity(),
            steps,
            market.rate(),
            market.volatility(),
        )
    }

    /// Pricing date (time zero of the lattice).
    pub fn pricing_date(&self) -> Date {
        self.pricing_date
    }

    /// Maturity date (last column of the lattice).
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Number of time steps `N`.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Step length `Δt` in years.
    pub fn delta_t(&self) -> Time {
        self.delta_t
    }

    /// Up-move multiplier `α = exp(σ √(3 Δt))`.
    pub fn alpha(&self) -> Real {
        self.alpha
    }

    /// One-step growth factor `exp(r Δt)`.
    pub fn growth(&self) -> Real {
        self.growth
    }

    /// One-step discount factor `exp(−r Δt)`, identical for every step.
    pub fn discount(&self) -> DiscountFactor {
        self.discount
    }

    /// `exp(2 r Δt) · (exp(σ² Δt) − 1)`; a node's conditional variance is
    /// this times `S²`.
    pub fn variance_factor(&self) -> Real {
        self.variance_factor
    }

    /// Whether `date` falls in the window of the step that builds column
    /// `step` (1-based).
    ///
    /// Step `k` covers `[(k−1)·Δt, k·Δt)` years after the pricing date,
    /// measured in fractional Actual/365 days. A date on the pricing date
    /// belongs to step 1; a date on maturity belongs to no step.
    pub fn step_contains(&self, step: Size, date: Date) -> bool {
        if step == 0 || step > self.steps {
            return false;
        }
        let days = self.pricing_date.days_between(date) as Real;
        let start = Actual365Fixed.days_in((step - 1) as Real * self.delta_t);
        let end = Actual365Fixed.days_in(step as Real * self.delta_t);
        start <= days && days < end
    }
}
