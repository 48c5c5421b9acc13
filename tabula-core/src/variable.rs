//! Names for tableau columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A variable of the tableau, identified by its role.
///
/// Decision variables occupy columns `0..n`, slack variables columns
/// `n..n+m`. Both indices are zero-based; the display form is one-based
/// (`x1`, `s1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    /// Decision variable `x{j+1}`
    Decision(usize),
    /// Slack variable of constraint row `k`
    Slack(usize),
}

impl Variable {
    /// Classify a tableau column given the number of decision variables.
    #[must_use]
    pub fn from_column(column: usize, num_vars: usize) -> Self {
        if column < num_vars {
            Self::Decision(column)
        } else {
            Self::Slack(column - num_vars)
        }
    }

    /// Tableau column of this variable.
    #[must_use]
    pub fn column(self, num_vars: usize) -> usize {
        match self {
            Self::Decision(j) => j,
            Self::Slack(k) => num_vars + k,
        }
    }

    /// Whether this is a decision variable
    #[must_use]
    pub fn is_decision(self) -> bool {
        matches!(self, Self::Decision(_))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decision(j) => write!(f, "x{}", j + 1),
            Self::Slack(k) => write!(f, "s{}", k + 1),
        }
    }
}
