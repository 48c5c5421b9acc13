//! Fuzz target for caller-supplied pivot cells
//!
//! Arbitrary cells must be rejected with an error, never a panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tabula_core::{apply_pivot, LpProblem, PivotCell, TableauState};

#[derive(Debug, Arbitrary)]
struct FuzzPivots {
    coefficients: [i8; 9],
    limits: [u8; 3],
    cells: Vec<(u8, u8)>,
}

fuzz_target!(|input: FuzzPivots| {
    let constraints = input
        .coefficients
        .chunks(3)
        .map(|row| row.iter().map(|&v| f64::from(v)).collect())
        .collect();
    let limits = input.limits.iter().map(|&v| f64::from(v)).collect();

    let Ok(problem) = LpProblem::new(vec![1.0, 2.0, 3.0], constraints, limits) else {
        return;
    };
    let mut tableau = TableauState::new(&problem);

    for &(column, row) in input.cells.iter().take(16) {
        let cell = PivotCell::new(usize::from(column), usize::from(row));
        if apply_pivot(&mut tableau, cell, 1e-9).is_ok() {
            assert_eq!(tableau.basis()[cell.row], cell.column);
        }
    }
});
