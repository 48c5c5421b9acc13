//! Standard-form linear program input.
//!
//! An [`LpProblem`] describes
//!
//! ```text
//! maximize    c · x
//! subject to  A x <= b
//!             x >= 0
//! ```
//!
//! with `b >= 0`, so that the all-slack basis is feasible and no phase-one
//! step is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimplexError, SimplexResult};
use crate::variable::Variable;

/// Validated linear program in standard maximization form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProblem")]
pub struct LpProblem {
    objective: Vec<f64>,
    constraints: Vec<Vec<f64>>,
    limits: Vec<f64>,
}

/// Unchecked wire shape of an [`LpProblem`].
#[derive(Deserialize)]
struct RawProblem {
    objective: Vec<f64>,
    constraints: Vec<Vec<f64>>,
    limits: Vec<f64>,
}

impl TryFrom<RawProblem> for LpProblem {
    type Error = SimplexError;

    fn try_from(raw: RawProblem) -> SimplexResult<Self> {
        Self::new(raw.objective, raw.constraints, raw.limits)
    }
}

impl LpProblem {
    /// Build a problem, rejecting anything the tableau cannot start from.
    ///
    /// # Errors
    ///
    /// [`SimplexError::InvalidProblemDefinition`] when the objective or the
    /// constraint set is empty, a constraint row has the wrong length, the
    /// limits do not match the rows, any entry is not finite, or any limit is
    /// negative.
    pub fn new(
        objective: Vec<f64>,
        constraints: Vec<Vec<f64>>,
        limits: Vec<f64>,
    ) -> SimplexResult<Self> {
        let n = objective.len();
        if n == 0 {
            return Err(SimplexError::invalid_problem(
                "objective must have at least one coefficient",
            ));
        }
        if constraints.is_empty() {
            return Err(SimplexError::invalid_problem(
                "at least one constraint row is required",
            ));
        }
        if limits.len() != constraints.len() {
            return Err(SimplexError::invalid_problem(format!(
                "{} limits given for {} constraint rows",
                limits.len(),
                constraints.len()
            )));
        }
        if let Some(j) = objective.iter().position(|c| !c.is_finite()) {
            return Err(SimplexError::invalid_problem(format!(
                "objective coefficient {} is not finite",
                j + 1
            )));
        }
        for (i, row) in constraints.iter().enumerate() {
            if row.len() != n {
                return Err(SimplexError::invalid_problem(format!(
                    "constraint row {} has {} coefficients, expected {}",
                    i + 1,
                    row.len(),
                    n
                )));
            }
            if let Some(j) = row.iter().position(|a| !a.is_finite()) {
                return Err(SimplexError::invalid_problem(format!(
                    "coefficient {} of constraint row {} is not finite",
                    j + 1,
                    i + 1
                )));
            }
        }
        for (i, &b) in limits.iter().enumerate() {
            if !b.is_finite() {
                return Err(SimplexError::invalid_problem(format!(
                    "limit of constraint row {} is not finite",
                    i + 1
                )));
            }
            // No phase one: the slack basis must start feasible.
            if b < 0.0 {
                return Err(SimplexError::invalid_problem(format!(
                    "limit of constraint row {} is negative ({})",
                    i + 1,
                    b
                )));
            }
        }

        Ok(Self {
            objective,
            constraints,
            limits,
        })
    }

    /// Number of decision variables (`n`)
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraint rows (`m`)
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective coefficients, maximization sense
    #[must_use]
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Constraint matrix rows
    #[must_use]
    pub fn constraints(&self) -> &[Vec<f64>] {
        &self.constraints
    }

    /// Right-hand sides
    #[must_use]
    pub fn limits(&self) -> &[f64] {
        &self.limits
    }

    /// Objective value `c · x` at a point.
    ///
    /// Missing trailing entries of `x` count as zero.
    #[must_use]
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// Check `x >= 0` and `A x <= b`, each within `tolerance`.
    #[must_use]
    pub fn is_feasible(&self, x: &[f64], tolerance: f64) -> bool {
        if x.len() != self.num_vars() || x.iter().any(|&v| v < -tolerance) {
            return false;
        }
        self.constraints.iter().zip(&self.limits).all(|(row, &b)| {
            let lhs: f64 = row.iter().zip(x).map(|(a, v)| a * v).sum();
            lhs <= b + tolerance
        })
    }
}

/// Write `c1 x1 + c2 x2 ...`, skipping zero terms.
fn write_linear(f: &mut fmt::Formatter<'_>, coeffs: &[f64], num_vars: usize) -> fmt::Result {
    let mut first = true;
    for (j, &c) in coeffs.iter().enumerate() {
        if c == 0.0 {
            continue;
        }
        let var = Variable::from_column(j, num_vars);
        let magnitude = c.abs();
        match (first, c < 0.0) {
            (true, true) => write!(f, "-")?,
            (true, false) => {}
            (false, true) => write!(f, " - ")?,
            (false, false) => write!(f, " + ")?,
        }
        if magnitude == 1.0 {
            write!(f, "{}", var)?;
        } else {
            write!(f, "{}{}", magnitude, var)?;
        }
        first = false;
    }
    if first {
        write!(f, "0")?;
    }
    Ok(())
}

impl fmt::Display for LpProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.num_vars();
        write!(f, "maximize z = ")?;
        write_linear(f, &self.objective, n)?;
        writeln!(f)?;
        writeln!(f, "subject to")?;
        for (i, (row, b)) in self.constraints.iter().zip(&self.limits).enumerate() {
            write!(f, "  r{}: ", i + 1)?;
            write_linear(f, row, n)?;
            writeln!(f, " <= {}", b)?;
        }
        let vars: Vec<String> = (0..n)
            .map(|j| Variable::Decision(j).to_string())
            .collect();
        write!(f, "  {} >= 0", vars.join(", "))
    }
}
