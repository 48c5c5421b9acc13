//! Error types for the tableau simplex engine.

use thiserror::Error;

/// Result type for simplex operations
pub type SimplexResult<T> = Result<T, SimplexError>;

/// Errors that abort a solve attempt.
///
/// None of these are recoverable inside the engine: a caller that hits one
/// must build a new problem or engine to try again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimplexError {
    /// The problem cannot be turned into an initial tableau
    #[error("invalid problem definition: {reason}")]
    InvalidProblemDefinition {
        /// What is wrong with the input
        reason: String,
    },

    /// The chosen pivot element is zero or too close to zero to divide by
    #[error(
        "degenerate pivot element {value:e} at row {row}, column {column} (tolerance {tolerance:e})"
    )]
    DegeneratePivotElement {
        /// Pivot row
        row: usize,
        /// Pivot column
        column: usize,
        /// Value found in the pivot cell
        value: f64,
        /// Tolerance the value was compared against
        tolerance: f64,
    },

    /// `run_to_completion` applied the configured number of pivots without
    /// reaching a terminal state
    #[error("iteration limit exceeded: {limit} pivots applied without reaching a terminal state")]
    IterationLimitExceeded {
        /// Configured pivot cap
        limit: usize,
    },

    /// A pivot cell outside the constraint rows or variable columns
    #[error("pivot cell (row {row}, column {column}) is outside the tableau")]
    PivotOutOfBounds {
        /// Requested row
        row: usize,
        /// Requested column
        column: usize,
    },

    /// Solver configuration rejected by [`SolverConfig::validate`](crate::SolverConfig::validate)
    #[error("invalid solver configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: String,
    },
}

impl SimplexError {
    /// Shorthand for [`SimplexError::InvalidProblemDefinition`]
    pub(crate) fn invalid_problem(reason: impl Into<String>) -> Self {
        Self::InvalidProblemDefinition {
            reason: reason.into(),
        }
    }

    /// Whether this error was raised while validating input, before any
    /// tableau work happened
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidProblemDefinition { .. } | Self::InvalidConfig { .. }
        )
    }
}
