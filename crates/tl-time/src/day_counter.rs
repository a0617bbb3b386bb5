//! `DayCounter` trait and the Actual/365 (Fixed) convention.
//!
//! A day counter turns a pair of dates into a fraction of a year. The lattice
//! measures its horizon, its step length and the position of the ex-dividend
//! date with the same convention.

use crate::date::Date;
use tl_core::{Real, Time};

/// A convention for counting the fraction of a year between two dates.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Number of days between `d1` and `d2` according to this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64;

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;

    /// Number of days covered by a year fraction `t`, the inverse of
    /// [`year_fraction`][Self::year_fraction] for fixed-denominator
    /// conventions.
    fn days_in(&self, t: Time) -> Real;
}

/// Actual/365 (Fixed) day counter.
///
/// `year_fraction = actual_days / 365`
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        d1.days_between(d2) as i64
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }

    fn days_in(&self, t: Time) -> Real {
        t * 365.0
    }
}
