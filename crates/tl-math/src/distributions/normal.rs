//! Standard normal distribution.
//!
//! The cumulative function delegates to the complementary error function of
//! the `statrs` crate, which stays accurate deep into both tails.

use statrs::function::erf::erfc;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use tl_core::Real;

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution function Φ(x).
///
/// `Φ(x) = erfc(−x/√2) / 2`
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn normal_pdf_at_zero() {
        assert_relative_eq!(normal_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-15);
    }

    #[test]
    fn normal_cdf_known_values() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_relative_eq!(normal_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-12);
        assert_relative_eq!(normal_cdf(-1.96), 0.024_997_895_148_220_43, epsilon = 1e-12);
    }

    #[test]
    fn normal_cdf_tails() {
        assert!(normal_cdf(-10.0) > 0.0);
        assert!(normal_cdf(-10.0) < 1e-20);
        assert_relative_eq!(normal_cdf(10.0), 1.0, epsilon = 1e-15);
    }

    proptest! {
        #[test]
        fn cdf_symmetry(x in -8.0f64..8.0) {
            prop_assert!((normal_cdf(x) + normal_cdf(-x) - 1.0).abs() < 1e-14);
        }

        #[test]
        fn cdf_is_monotone(x in -6.0f64..6.0, dx in 1e-3f64..1.0) {
            prop_assert!(normal_cdf(x + dx) > normal_cdf(x));
        }
    }
}
