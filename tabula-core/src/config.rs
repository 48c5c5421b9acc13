//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SimplexError, SimplexResult};

/// Configuration for a [`StepEngine`](crate::StepEngine) run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Numerical tolerance for sign tests, pivot magnitude and invariant checks
    pub tolerance: f64,
    /// Maximum number of pivots `run_to_completion` may apply
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 1000,
        }
    }
}

impl SolverConfig {
    /// Set the numerical tolerance
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the pivot cap for `run_to_completion`
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// [`SimplexError::InvalidConfig`] if the tolerance is negative or not
    /// finite, or if `max_iterations` is zero.
    pub fn validate(&self) -> SimplexResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SimplexError::InvalidConfig {
                reason: format!(
                    "tolerance must be finite and non-negative, got {}",
                    self.tolerance
                ),
            });
        }
        if self.max_iterations == 0 {
            return Err(SimplexError::InvalidConfig {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
