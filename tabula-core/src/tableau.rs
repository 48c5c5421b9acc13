//! Simplex tableau storage.
//!
//! The tableau of a problem with `n` decision variables and `m` constraints is
//! an `(m + 1) x (n + m + 1)` matrix:
//!
//! ```text
//!            x1 .. xn   s1 .. sm   rhs
//! row 0      a_0j       1  0  0    b_0
//! ...        ...        0  1  0    ...
//! row m-1    a_(m-1)j   0  0  1    b_(m-1)
//! row m     -c_j        0  0  0    z
//! ```
//!
//! stored row-major in one contiguous buffer.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::problem::LpProblem;
use crate::variable::Variable;

/// Dense row-major matrix backed by a single buffer.
///
/// Serializes as a list of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<f64>>", try_from = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero matrix
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell value, or `None` outside the matrix
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Borrow one row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row {} out of bounds ({} rows)", row, self.rows);
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    fn row_mut(&mut self, row: usize) -> &mut [f64] {
        assert!(row < self.rows, "row {} out of bounds ({} rows)", row, self.rows);
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Iterate over one column from top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if `col` is out of bounds.
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        assert!(col < self.cols, "column {} out of bounds ({} columns)", col, self.cols);
        self.data.iter().skip(col).step_by(self.cols).copied()
    }

    /// Iterate over rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |r| &self.data[r * self.cols..(r + 1) * self.cols])
    }

    /// Copy into nested rows
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    /// `row[target] <- row[target] - factor * row[source]`
    fn sub_scaled_row(&mut self, target: usize, source: usize, factor: f64) {
        assert_ne!(target, source, "row cannot be reduced by itself");
        assert!(target < self.rows && source < self.rows, "row out of bounds");
        let cols = self.cols;
        let (dst, src) = if target < source {
            let (head, tail) = self.data.split_at_mut(source * cols);
            (&mut head[target * cols..(target + 1) * cols], &tail[..cols])
        } else {
            let (head, tail) = self.data.split_at_mut(target * cols);
            (&mut tail[..cols], &head[source * cols..(source + 1) * cols])
        };
        for (d, &s) in dst.iter_mut().zip(src) {
            *d -= factor * s;
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "cell ({}, {}) out of bounds", row, col);
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "cell ({}, {}) out of bounds", row, col);
        &mut self.data[row * self.cols + col]
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.to_rows()
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = String;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(i) = rows.iter().position(|r| r.len() != cols) {
            return Err(format!(
                "row {} has {} entries, expected {}",
                i,
                rows[i].len(),
                cols
            ));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }
}

/// Tableau matrix together with the basis mapping.
///
/// `basis[i]` is the column of the variable basic in constraint row `i`.
/// Read access is unrestricted; mutation goes through the crate-internal row
/// operations used by [`apply_pivot`](crate::apply_pivot).
#[derive(Debug, Clone, PartialEq)]
pub struct TableauState {
    matrix: Matrix,
    basis: Vec<usize>,
    num_vars: usize,
    num_constraints: usize,
}

impl TableauState {
    /// Build the initial tableau with the all-slack basis.
    #[must_use]
    pub fn new(problem: &LpProblem) -> Self {
        let num_vars = problem.num_vars();
        let num_constraints = problem.num_constraints();
        let total_vars = num_vars + num_constraints;
        let mut matrix = Matrix::zeros(num_constraints + 1, total_vars + 1);

        for (i, (row, &b)) in problem
            .constraints()
            .iter()
            .zip(problem.limits())
            .enumerate()
        {
            for (j, &a) in row.iter().enumerate() {
                matrix[(i, j)] = a;
            }
            matrix[(i, num_vars + i)] = 1.0;
            matrix[(i, total_vars)] = b;
        }

        // Objective row holds -c so that negative entries mark improving columns
        for (j, &c) in problem.objective().iter().enumerate() {
            matrix[(num_constraints, j)] = -c;
        }

        Self {
            matrix,
            basis: (num_vars..total_vars).collect(),
            num_vars,
            num_constraints,
        }
    }

    /// Number of decision variables (`n`)
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of constraint rows (`m`)
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    /// Decision plus slack columns (`n + m`)
    #[must_use]
    pub fn num_variables_total(&self) -> usize {
        self.num_vars + self.num_constraints
    }

    /// Index of the right-hand-side column
    #[must_use]
    pub fn rhs_column(&self) -> usize {
        self.num_vars + self.num_constraints
    }

    /// Index of the objective row
    #[must_use]
    pub fn objective_row_index(&self) -> usize {
        self.num_constraints
    }

    /// Underlying matrix
    #[must_use]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Current basis mapping
    #[must_use]
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    /// Cell value.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of bounds.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    /// Row slice, including the objective row at index `m`
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        self.matrix.row(row)
    }

    /// Column values, including the objective row entry last
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        self.matrix.column(col)
    }

    /// Objective row (reduced costs followed by the objective value)
    #[must_use]
    pub fn objective_row(&self) -> &[f64] {
        self.matrix.row(self.num_constraints)
    }

    /// Right-hand side of a row
    #[must_use]
    pub fn rhs(&self, row: usize) -> f64 {
        self.matrix[(row, self.rhs_column())]
    }

    /// Objective value at the current basic solution
    #[must_use]
    pub fn objective_value(&self) -> f64 {
        self.rhs(self.num_constraints)
    }

    /// Variable occupying a column
    #[must_use]
    pub fn variable(&self, col: usize) -> Variable {
        Variable::from_column(col, self.num_vars)
    }

    /// Variable basic in a constraint row
    #[must_use]
    pub fn basic_variable(&self, row: usize) -> Variable {
        self.variable(self.basis[row])
    }

    /// Minimum-ratio test entry for one row: `rhs / a` when `a > tolerance`.
    #[must_use]
    pub fn ratio(&self, row: usize, col: usize, tolerance: f64) -> Option<f64> {
        let coeff = self.matrix[(row, col)];
        if coeff > tolerance {
            Some(self.rhs(row) / coeff)
        } else {
            None
        }
    }

    /// Minimum-ratio test entries for every constraint row
    #[must_use]
    pub fn ratios(&self, col: usize, tolerance: f64) -> Vec<Option<f64>> {
        (0..self.num_constraints)
            .map(|i| self.ratio(i, col, tolerance))
            .collect()
    }

    /// Whether the basis columns form the identity over the constraint rows.
    #[must_use]
    pub fn basis_is_identity(&self, tolerance: f64) -> bool {
        let mut seen = vec![false; self.num_variables_total()];
        for &col in &self.basis {
            if col >= seen.len() || seen[col] {
                return false;
            }
            seen[col] = true;
        }
        self.basis.iter().enumerate().all(|(i, &col)| {
            (0..self.num_constraints).all(|k| {
                let expected = if k == i { 1.0 } else { 0.0 };
                (self.matrix[(k, col)] - expected).abs() <= tolerance
            })
        })
    }

    /// `row <- row / divisor`
    pub(crate) fn scale_row(&mut self, row: usize, divisor: f64) {
        for v in self.matrix.row_mut(row) {
            *v /= divisor;
        }
    }

    /// `row[target] <- row[target] - factor * row[pivot_row]`
    pub(crate) fn replace_row(&mut self, target: usize, factor: f64, pivot_row: usize) {
        self.matrix.sub_scaled_row(target, pivot_row, factor);
    }

    pub(crate) fn set_basic(&mut self, row: usize, col: usize) {
        self.basis[row] = col;
    }
}
