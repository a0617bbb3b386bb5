//! Vanilla option contract.

use crate::exercise::ExerciseType;
use crate::instrument::{PricingEngine, PricingResults};
use crate::payoff::{OptionType, Payoff, PlainVanillaPayoff};
use std::fmt;
use tl_core::{ensure, errors::Result, Real};
use tl_time::Date;

/// Immutable terms of a plain vanilla option on a single underlying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionContract {
    payoff: PlainVanillaPayoff,
    exercise: ExerciseType,
    maturity: Date,
}

impl OptionContract {
    /// Create a new contract.
    ///
    /// # Errors
    /// `Precondition` if the strike is not strictly positive or the maturity
    /// is the null date.
    pub fn new(
        option_type: OptionType,
        exercise: ExerciseType,
        strike: Real,
        maturity: Date,
    ) -> Result<Self> {
        ensure!(
            strike.is_finite() && strike > 0.0,
            "strike must be positive, got {strike}"
        );
        ensure!(!maturity.is_null(), "maturity must be a valid date");
        Ok(Self {
            payoff: PlainVanillaPayoff::new(option_type, strike),
            exercise,
            maturity,
        })
    }

    /// Convenience: a European call/put.
    pub fn european(option_type: OptionType, strike: Real, maturity: Date) -> Result<Self> {
        Self::new(option_type, ExerciseType::European, strike, maturity)
    }

    /// Convenience: an American call/put.
    pub fn american(option_type: OptionType, strike: Real, maturity: Date) -> Result<Self> {
        Self::new(option_type, ExerciseType::American, strike, maturity)
    }

    /// Copy with a different strike.
    pub fn with_strike(self, strike: Real) -> Result<Self> {
        Self::new(self.option_type(), self.exercise, strike, self.maturity)
    }

    /// Copy with a different maturity.
    pub fn with_maturity(self, maturity: Date) -> Result<Self> {
        Self::new(self.option_type(), self.exercise, self.strike(), maturity)
    }

    /// Copy with a different exercise style.
    pub fn with_exercise(mut self, exercise: ExerciseType) -> Self {
        self.exercise = exercise;
        self
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.payoff.strike
    }

    /// The option type (call/put).
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type
    }

    /// The exercise style.
    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// The maturity date.
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Exercise value at underlying price `spot`.
    pub fn payoff(&self, spot: Real) -> Real {
        self.payoff.value(spot)
    }

    /// Price this contract with the given engine.
    pub fn price(&self, engine: &dyn PricingEngine<OptionContract>) -> Result<PricingResults> {
        engine.calculate(self)
    }
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.exercise,
            self.payoff.description(),
            self.maturity
        )
    }
}
