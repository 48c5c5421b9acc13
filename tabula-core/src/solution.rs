//! Reading results off a terminal tableau.

use serde::{Deserialize, Deserializer, Serialize};

use crate::problem::LpProblem;
use crate::tableau::TableauState;
use crate::variable::Variable;

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveStatus {
    /// Finite optimum found
    Optimal,
    /// Objective grows without bound along the entering column
    Unbounded {
        /// Column whose increase is unbounded
        entering_column: usize,
    },
}

/// Result of a finished solve.
///
/// For an unbounded problem no finite point is reported: the objective value
/// is `+inf` and both value vectors are empty, so callers read the direction
/// from [`SolveStatus::Unbounded`] instead. JSON has no infinity and writes
/// the objective as `null`; reading `null` back yields `+inf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Terminal status
    #[serde(flatten)]
    pub status: SolveStatus,
    /// Optimal objective value `c · x`, `+inf` when unbounded
    #[serde(deserialize_with = "objective_or_infinity")]
    pub objective_value: f64,
    /// Values of `x1..xn`
    pub decision_values: Vec<f64>,
    /// Values of `s1..sm`
    pub slack_values: Vec<f64>,
}

fn objective_or_infinity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl Solution {
    /// Whether a finite optimum was found
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Value of a single variable, if the solution is optimal and the
    /// variable exists
    #[must_use]
    pub fn value_of(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Decision(j) => self.decision_values.get(j).copied(),
            Variable::Slack(k) => self.slack_values.get(k).copied(),
        }
    }

    /// Check the solution against the original problem: `x >= 0`,
    /// `A x <= b`, and `c · x` equal to the reported objective value, all
    /// within `tolerance` (relative to magnitude for the objective).
    #[must_use]
    pub fn satisfies(&self, problem: &LpProblem, tolerance: f64) -> bool {
        if !self.is_optimal() || !problem.is_feasible(&self.decision_values, tolerance) {
            return false;
        }
        let direct = problem.evaluate(&self.decision_values);
        let scale = direct.abs().max(self.objective_value.abs()).max(1.0);
        (direct - self.objective_value).abs() <= tolerance * scale
    }
}

/// Extract an optimal solution from a tableau whose objective row has no
/// negative reduced cost.
///
/// Basic variables take the right-hand side of their row; all other
/// variables are zero. The objective row's right-hand side already equals
/// `c · x` for the current basis, since the row was initialized with `-c`.
#[must_use]
pub fn extract_optimal(tableau: &TableauState) -> Solution {
    let n = tableau.num_vars();
    let m = tableau.num_constraints();
    let mut decision_values = vec![0.0; n];
    let mut slack_values = vec![0.0; m];

    for (row, &col) in tableau.basis().iter().enumerate() {
        let value = tableau.rhs(row);
        match tableau.variable(col) {
            Variable::Decision(j) => decision_values[j] = value,
            Variable::Slack(k) => slack_values[k] = value,
        }
    }

    Solution {
        status: SolveStatus::Optimal,
        objective_value: tableau.objective_value(),
        decision_values,
        slack_values,
    }
}

/// Report an unbounded problem along `entering_column`.
#[must_use]
pub fn extract_unbounded(entering_column: usize) -> Solution {
    Solution {
        status: SolveStatus::Unbounded { entering_column },
        objective_value: f64::INFINITY,
        decision_values: Vec::new(),
        slack_values: Vec::new(),
    }
}
