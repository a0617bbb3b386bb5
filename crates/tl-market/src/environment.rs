//! Flat Black-Scholes market with a single discrete cash dividend.
//!
//! `dS/S = r dt + σ dW` between dividend dates; on the ex-dividend date the
//! underlying drops by the cash amount.

use tl_core::{ensure, errors::Result, Price, Rate, Real, Volatility};
use tl_time::Date;

/// A cash dividend paid on an ex-dividend date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashDividend {
    /// Cash amount deducted from the forward on the ex-date.
    pub amount: Real,
    /// Ex-dividend date.
    pub ex_date: Date,
}

/// Immutable snapshot of the market inputs of one pricing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketEnvironment {
    rate: Rate,
    volatility: Volatility,
    spot: Price,
    dividend: Option<CashDividend>,
}

impl MarketEnvironment {
    /// Create a dividend-free market.
    ///
    /// # Errors
    /// `Precondition` if `volatility <= 0`, `spot <= 0`, or any input is not
    /// finite.
    pub fn new(rate: Rate, volatility: Volatility, spot: Price) -> Result<Self> {
        ensure!(rate.is_finite(), "rate must be finite, got {rate}");
        ensure!(
            volatility.is_finite() && volatility > 0.0,
            "volatility must be positive, got {volatility}"
        );
        ensure!(
            spot.is_finite() && spot > 0.0,
            "spot must be positive, got {spot}"
        );
        Ok(Self {
            rate,
            volatility,
            spot,
            dividend: None,
        })
    }

    /// Attach a cash dividend. An amount of zero removes any dividend.
    ///
    /// # Errors
    /// `Precondition` if `amount < 0` or not finite.
    pub fn with_dividend(mut self, amount: Real, ex_date: Date) -> Result<Self> {
        ensure!(
            amount.is_finite() && amount >= 0.0,
            "dividend must be non-negative, got {amount}"
        );
        self.dividend = (amount > 0.0).then_some(CashDividend { amount, ex_date });
        Ok(self)
    }

    /// Copy with a different spot.
    pub fn with_spot(self, spot: Price) -> Result<Self> {
        Self::new(self.rate, self.volatility, spot).map(|m| m.keep_dividend(self.dividend))
    }

    /// Copy with a different volatility.
    pub fn with_volatility(self, volatility: Volatility) -> Result<Self> {
        Self::new(self.rate, volatility, self.spot).map(|m| m.keep_dividend(self.dividend))
    }

    /// Copy with a different rate.
    pub fn with_rate(self, rate: Rate) -> Result<Self> {
        Self::new(rate, self.volatility, self.spot).map(|m| m.keep_dividend(self.dividend))
    }

    fn keep_dividend(mut self, dividend: Option<CashDividend>) -> Self {
        self.dividend = dividend;
        self
    }

    /// Continuously-compounded risk-free rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Black volatility.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    /// Spot price of the underlying.
    pub fn spot(&self) -> Price {
        self.spot
    }

    /// The cash dividend, if any.
    pub fn dividend(&self) -> Option<CashDividend> {
        self.dividend
    }
}
