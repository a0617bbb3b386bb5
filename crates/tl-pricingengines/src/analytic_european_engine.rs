//! Analytic European option engine (Black-Scholes).
//!
//! Closed-form price and first/second-order Greeks of a European vanilla
//! option on a non-dividend-paying underlying. The lattice is checked against
//! it; cash dividends are not reflected here.

use tl_core::{
    errors::{Error, Result},
    Real,
};
use tl_instruments::{OptionContract, OptionType, PricingEngine, PricingResults};
use tl_market::MarketEnvironment;
use tl_math::{normal_cdf, normal_pdf};
use tl_time::{Actual365Fixed, Date, DayCounter};

/// Analytic pricing engine for European vanilla options.
///
/// Implements the Black-Scholes closed-form solution:
///
/// $$C = S N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S N(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r \pm \sigma^2/2)T}{\sigma\sqrt{T}}$
/// and `T` is the Actual/365 year fraction from the pricing date to maturity.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticEuropeanEngine {
    market: MarketEnvironment,
    pricing_date: Date,
}

impl AnalyticEuropeanEngine {
    /// Create a new engine for a market snapshot taken on `pricing_date`.
    pub fn new(market: MarketEnvironment, pricing_date: Date) -> Self {
        Self {
            market,
            pricing_date,
        }
    }
}

/// Compute Black-Scholes price and Greeks for a European option.
///
/// Returns `(price, delta, gamma, vega, theta, rho)`; vega and rho are per
/// unit change, theta is per year.
pub fn black_scholes(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    volatility: Real,
    time_to_expiry: Real,
) -> (Real, Real, Real, Real, Real, Real) {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return (intrinsic, 0.0, 0.0, 0.0, 0.0, 0.0);
    }

    let r = risk_free_rate;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df = (-r * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if spot > strike * df { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * nd1 - strike * df * nd2);
    let delta = phi * nd1;
    let gamma = if std_dev > 1e-15 {
        npd1 / (spot * std_dev)
    } else {
        0.0
    };
    let vega = spot * npd1 * sqrt_t;
    let theta = -(spot * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df * nd2;
    let rho = phi * strike * t * df * nd2;

    (price, delta, gamma, vega, theta, rho)
}

impl PricingEngine<OptionContract> for AnalyticEuropeanEngine {
    fn calculate(&self, option: &OptionContract) -> Result<PricingResults> {
        if option.exercise().is_early() {
            return Err(Error::InvalidArgument(format!(
                "closed form prices European exercise only, got {option}"
            )));
        }
        let t = Actual365Fixed.year_fraction(self.pricing_date, option.maturity());
        let (price, delta, gamma, vega, theta, rho) = black_scholes(
            option.option_type(),
            self.market.spot(),
            option.strike(),
            self.market.rate(),
            self.market.volatility(),
            t,
        );

        Ok(PricingResults::from_npv(price)
            .with_result("delta", delta)
            .with_result("gamma", gamma)
            .with_result("vega", vega)
            .with_result("theta", theta)
            .with_result("rho", rho))
    }
}
