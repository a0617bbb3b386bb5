//! Comparison utilities.

use tl_core::Real;

/// Default absolute tolerance; also the column reachability tolerance.
pub const EPSILON: Real = 1e-10;

/// Return `true` if `|a - b| <= epsilon`.
#[inline]
pub fn close(a: Real, b: Real, epsilon: Real) -> bool {
    (a - b).abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_basic() {
        assert!(close(1.0, 1.0 + 1e-11, EPSILON));
        assert!(!close(1.0, 1.0 + 1e-9, EPSILON));
    }

    #[test]
    fn nan_is_never_close() {
        assert!(!close(f64::NAN, 1.0, EPSILON));
        assert!(!close(f64::NAN, f64::NAN, EPSILON));
    }
}
