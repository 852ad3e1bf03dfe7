//! Solver error types.

use thiserror::Error;

/// Why a regression fit produced no estimates.
///
/// Every variant becomes a failed task; none of them stop a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The information matrix could not be inverted.
    #[error("singular matrix: predictors are collinear")]
    Singular,

    /// The design or response holds NaN or infinite values.
    #[error("non-finite value in {0}")]
    NonFinite(String),

    /// Inputs have incompatible shapes or too few rows.
    #[error("dimension mismatch: {0}")]
    Dimension(String),

    /// Iterations produced non-finite estimates.
    #[error("estimates diverged after {iterations} iterations")]
    Diverged { iterations: usize },

    /// The outcome is perfectly predicted by the design.
    #[error("perfect separation detected, results not available")]
    PerfectSeparation,
}

/// Result type for solver calls.
pub type Result<T> = std::result::Result<T, FitError>;
