//! Error types for trilattice.
//!
//! Every fallible operation in the workspace returns the single
//! `thiserror`-derived [`Error`] enum below. The three lattice failure modes
//! (configuration, calibration, consistency) are distinct variants so that a
//! driver running many lattices can decide per failure whether to abort or
//! skip.

use thiserror::Error;

/// The top-level error type used throughout trilattice.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Date-related error.
    #[error("date error: {0}")]
    Date(String),

    /// The time discretization is unusable (non-positive `Δt` or zero steps).
    ///
    /// Raised when model parameters are derived, before any lattice work.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A transition probability came out negative, or a forward price could
    /// not be placed on the lattice.
    ///
    /// The market/model combination cannot be represented by this lattice
    /// geometry; the run is aborted.
    #[error("calibration error at step {step} (spot {spot:.6}): {detail}")]
    Calibration {
        /// Column of the node whose outgoing block failed.
        step: usize,
        /// Underlying price at the failing node.
        spot: f64,
        /// What went wrong, with the offending values.
        detail: String,
    },

    /// Reachability probabilities of a lattice column do not sum to one.
    #[error("consistency error: column {step} reachability sums to {total:.15}")]
    Consistency {
        /// Column whose probabilities were checked.
        step: usize,
        /// Observed sum of reachability probabilities.
        total: f64,
    },
}

impl Error {
    /// `true` for the three fatal lattice failure kinds.
    pub fn is_lattice_failure(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::Calibration { .. } | Error::Consistency { .. }
        )
    }
}

/// Shorthand `Result` type used throughout trilattice.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use tl_core::{ensure, errors::Error};
/// fn positive(x: f64) -> tl_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}
