//! Property-based tests for pivot selection

use proptest::prelude::*;
use tabula_core::{select_column, select_row, TableauState};

use super::engine_properties::problem_strategy;

const TOL: f64 = 1e-9;

proptest! {
    /// Selection is a pure function of the tableau
    #[test]
    fn selection_is_idempotent(problem in problem_strategy()) {
        let tableau = TableauState::new(&problem);
        let before = tableau.clone();

        let column = select_column(&tableau, TOL);
        prop_assert_eq!(column, select_column(&tableau, TOL));
        if let Some(col) = column {
            prop_assert_eq!(select_row(&tableau, col, TOL), select_row(&tableau, col, TOL));
        }
        prop_assert_eq!(tableau, before);
    }

    /// The chosen column is the lowest index among the most negative entries
    #[test]
    fn column_choice_follows_dantzig(problem in problem_strategy()) {
        let tableau = TableauState::new(&problem);
        let objective_row = tableau.objective_row();
        let width = tableau.num_variables_total();

        match select_column(&tableau, TOL) {
            None => prop_assert!(objective_row[..width].iter().all(|&v| v >= -TOL)),
            Some(col) => {
                prop_assert!(objective_row[col] < -TOL);
                prop_assert!(objective_row[..col].iter().all(|&v| v > objective_row[col]));
                prop_assert!(objective_row[col..width].iter().all(|&v| v >= objective_row[col]));
            }
        }
    }

    /// The chosen row attains the minimum ratio with the lowest index
    #[test]
    fn row_choice_minimizes_ratio(problem in problem_strategy()) {
        let tableau = TableauState::new(&problem);
        if let Some(col) = select_column(&tableau, TOL) {
            let ratios = tableau.ratios(col, TOL);
            match select_row(&tableau, col, TOL) {
                None => prop_assert!(ratios.iter().all(Option::is_none)),
                Some(row) => {
                    let best = ratios[row].expect("chosen row has a ratio");
                    for (i, ratio) in ratios.iter().enumerate() {
                        if let Some(r) = ratio {
                            prop_assert!(*r >= best);
                            if i < row {
                                prop_assert!(*r > best);
                            }
                        }
                    }
                }
            }
        }
    }
}
