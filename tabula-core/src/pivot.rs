//! Gauss-Jordan pivot on the tableau.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{SimplexError, SimplexResult};
use crate::select::PivotCell;
use crate::tableau::TableauState;

/// Row operations performed by one pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowReduction {
    /// Pivot element the pivot row was divided by
    pub divisor: f64,
    /// `(row, factor)` for every other row, objective row last: the row had
    /// `factor` times the normalized pivot row subtracted from it
    pub eliminations: Vec<(usize, f64)>,
}

/// Pivot the tableau on `cell` and make its column basic in its row.
///
/// The pivot row is divided by the pivot element, then the pivot column is
/// eliminated from every other row, the objective row included. Afterwards
/// the basis columns form the identity again. The returned [`RowReduction`]
/// lists the divisor and every elimination factor.
///
/// # Errors
///
/// - [`SimplexError::PivotOutOfBounds`] if `cell` does not address a
///   constraint row and a decision or slack column.
/// - [`SimplexError::DegeneratePivotElement`] if the pivot element's
///   magnitude is at or below `tolerance`. The tableau is left untouched.
pub fn apply_pivot(
    tableau: &mut TableauState,
    cell: PivotCell,
    tolerance: f64,
) -> SimplexResult<RowReduction> {
    let PivotCell { column, row } = cell;
    if row >= tableau.num_constraints() || column >= tableau.num_variables_total() {
        return Err(SimplexError::PivotOutOfBounds { row, column });
    }

    let pivot = tableau.value(row, column);
    if pivot.is_nan() || pivot.abs() <= tolerance {
        return Err(SimplexError::DegeneratePivotElement {
            row,
            column,
            value: pivot,
            tolerance,
        });
    }

    tableau.scale_row(row, pivot);
    trace!(row, pivot, "normalized pivot row");

    let mut eliminations = Vec::with_capacity(tableau.num_constraints());
    for i in 0..=tableau.num_constraints() {
        if i == row {
            continue;
        }
        let factor = tableau.value(i, column);
        eliminations.push((i, factor));
        if factor == 0.0 {
            continue;
        }
        tableau.replace_row(i, factor, row);
        trace!(row = i, factor, "eliminated pivot column");
    }

    tableau.set_basic(row, column);
    Ok(RowReduction {
        divisor: pivot,
        eliminations,
    })
}
