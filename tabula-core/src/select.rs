//! Pivot selection rules.
//!
//! The entering column follows Dantzig's rule (most negative reduced cost),
//! the leaving row the minimum-ratio test. Both break ties on the lowest
//! index. There is no anti-cycling rule, so a degenerate problem can cycle;
//! [`StepEngine::run_to_completion`](crate::StepEngine::run_to_completion)
//! caps the number of pivots instead.

use serde::{Deserialize, Serialize};

use crate::tableau::TableauState;

/// A pivot cell, addressed by tableau column and constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PivotCell {
    /// Entering column
    pub column: usize,
    /// Leaving row
    pub row: usize,
}

impl PivotCell {
    /// Create a pivot cell
    #[must_use]
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// Entering column: the most negative objective-row entry among the variable
/// columns.
///
/// Entries within `tolerance` of zero count as non-negative. Returns `None`
/// when no entry is negative, i.e. the current basis is optimal.
#[must_use]
pub fn select_column(tableau: &TableauState, tolerance: f64) -> Option<usize> {
    let obj_row = tableau.objective_row();

    let mut min_val = -tolerance;
    let mut min_idx = None;

    for (j, &v) in obj_row.iter().enumerate().take(tableau.num_variables_total()) {
        if v < min_val {
            min_val = v;
            min_idx = Some(j);
        }
    }

    min_idx
}

/// Leaving row for `column` by the minimum-ratio test.
///
/// Only rows whose coefficient exceeds `tolerance` compete. Returns `None`
/// when no row qualifies, i.e. the objective is unbounded along `column`.
#[must_use]
pub fn select_row(tableau: &TableauState, column: usize, tolerance: f64) -> Option<usize> {
    let mut min_ratio = f64::INFINITY;
    let mut min_idx = None;

    for i in 0..tableau.num_constraints() {
        if let Some(ratio) = tableau.ratio(i, column, tolerance) {
            if min_idx.is_none() || ratio < min_ratio {
                min_ratio = ratio;
                min_idx = Some(i);
            }
        }
    }

    min_idx
}

/// Outcome of running both rules on a tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    /// A pivot was found
    Pivot(PivotCell),
    /// No improving column
    Optimal,
    /// Improving column without a leaving row
    Unbounded {
        /// Entering column
        column: usize,
    },
}

pub(crate) fn select_pivot(tableau: &TableauState, tolerance: f64) -> Selection {
    match select_column(tableau, tolerance) {
        None => Selection::Optimal,
        Some(column) => match select_row(tableau, column, tolerance) {
            Some(row) => Selection::Pivot(PivotCell::new(column, row)),
            None => Selection::Unbounded { column },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LpProblem;

    const TOL: f64 = 1e-9;

    fn tableau(objective: Vec<f64>, constraints: Vec<Vec<f64>>, limits: Vec<f64>) -> TableauState {
        TableauState::new(&LpProblem::new(objective, constraints, limits).expect("valid problem"))
    }

    #[test]
    fn test_most_negative_column() {
        let t = tableau(
            vec![40.0, 30.0, 20.0],
            vec![
                vec![2.0, 5.0, 10.0],
                vec![2.0, 5.0, 1.0],
                vec![4.0, 2.0, 2.0],
            ],
            vec![900.0, 400.0, 600.0],
        );
        assert_eq!(select_column(&t, TOL), Some(0));
        assert_eq!(select_row(&t, 0, TOL), Some(2));
        assert_eq!(select_row(&t, 1, TOL), Some(1));
    }

    #[test]
    fn test_column_ties_take_lowest_index() {
        let t = tableau(vec![3.0, 5.0, 5.0], vec![vec![1.0, 1.0, 1.0]], vec![4.0]);
        assert_eq!(select_column(&t, TOL), Some(1));
    }

    #[test]
    fn test_row_ties_take_lowest_index() {
        let t = tableau(vec![1.0], vec![vec![2.0], vec![1.0], vec![1.0]], vec![4.0, 2.0, 2.0]);
        assert_eq!(select_row(&t, 0, TOL), Some(0));
    }

    #[test]
    fn test_zero_ratio_wins() {
        let t = tableau(vec![1.0], vec![vec![1.0], vec![3.0]], vec![5.0, 0.0]);
        assert_eq!(select_row(&t, 0, TOL), Some(1));
    }

    #[test]
    fn test_optimal_has_no_column() {
        let t = tableau(vec![-1.0, 0.0], vec![vec![1.0, 1.0]], vec![1.0]);
        assert_eq!(select_column(&t, TOL), None);
        assert_eq!(select_pivot(&t, TOL), Selection::Optimal);
    }

    #[test]
    fn test_entries_within_tolerance_are_not_negative() {
        let t = tableau(vec![1e-12], vec![vec![1.0]], vec![1.0]);
        assert_eq!(select_column(&t, TOL), None);
        assert_eq!(select_column(&t, 0.0), Some(0));
    }

    #[test]
    fn test_unbounded_column_has_no_row() {
        let t = tableau(vec![1.0], vec![vec![0.0]], vec![0.0]);
        assert_eq!(select_column(&t, TOL), Some(0));
        assert_eq!(select_row(&t, 0, TOL), None);
        assert_eq!(select_pivot(&t, TOL), Selection::Unbounded { column: 0 });
    }

    #[test]
    fn test_negative_coefficients_skipped() {
        let t = tableau(vec![1.0], vec![vec![-1.0], vec![2.0]], vec![1.0, 8.0]);
        assert_eq!(select_row(&t, 0, TOL), Some(1));
        assert_eq!(select_pivot(&t, TOL), Selection::Pivot(PivotCell::new(0, 1)));
    }

    #[test]
    fn test_selection_does_not_mutate() {
        let t = tableau(vec![2.0, 3.0], vec![vec![1.0, 1.0], vec![1.0, 3.0]], vec![4.0, 6.0]);
        let before = t.clone();
        for _ in 0..3 {
            let col = select_column(&t, TOL).expect("improving column");
            let _ = select_row(&t, col, TOL);
        }
        assert_eq!(t, before);
    }
}
