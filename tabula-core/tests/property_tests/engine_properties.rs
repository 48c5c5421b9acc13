//! Property-based tests for the step engine
//!
//! This module tests:
//! - Feasibility and objective agreement of reported optima
//! - Basis identity after every applied pivot
//! - Optimality and unboundedness certificates in terminal records
//! - Reset reproducibility

use proptest::collection::vec;
use proptest::prelude::*;
use tabula_core::{LpProblem, SimplexError, SolveStatus, StepEngine, StepKind, StepRecord};

const TOL: f64 = 1e-9;
const CHECK_TOL: f64 = 1e-6;

/// Strategy for small standard-form problems with integer data
pub(super) fn problem_strategy() -> impl Strategy<Value = LpProblem> {
    (1usize..=4, 1usize..=4).prop_flat_map(|(n, m)| {
        (
            vec(-5i32..10, n),
            vec(vec(-2i32..8, n), m),
            vec(0i32..50, m),
        )
            .prop_map(|(c, a, b)| {
                LpProblem::new(
                    c.into_iter().map(f64::from).collect(),
                    a.into_iter()
                        .map(|row| row.into_iter().map(f64::from).collect())
                        .collect(),
                    b.into_iter().map(f64::from).collect(),
                )
                .expect("generated problems are well formed")
            })
    })
}

/// Run to a terminal state, or `None` if the iteration cap was hit
fn run(problem: LpProblem) -> Option<StepEngine> {
    let mut engine = StepEngine::new(problem);
    match engine.run_to_completion() {
        Ok(_) => Some(engine),
        Err(SimplexError::IterationLimitExceeded { .. }) => None,
        Err(other) => panic!("unexpected solver error: {other}"),
    }
}

fn basis_is_identity(record: &StepRecord) -> bool {
    let tableau = record.tableau();
    record.basis().iter().enumerate().all(|(i, &col)| {
        (0..record.num_constraints()).all(|k| {
            let expected = if k == i { 1.0 } else { 0.0 };
            (tableau[(k, col)] - expected).abs() <= CHECK_TOL
        })
    })
}

fn objective_of(record: &StepRecord) -> f64 {
    let tableau = record.tableau();
    tableau[(tableau.rows() - 1, tableau.cols() - 1)]
}

proptest! {
    /// Reported optima are feasible and their objective equals c · x
    #[test]
    fn optimum_is_feasible(problem in problem_strategy()) {
        if let Some(engine) = run(problem.clone()) {
            let solution = engine.solution().expect("terminal engine");
            if solution.is_optimal() {
                prop_assert!(problem.is_feasible(&solution.decision_values, CHECK_TOL));
                prop_assert!(solution.satisfies(&problem, CHECK_TOL));
                prop_assert!(solution.slack_values.iter().all(|&s| s >= -CHECK_TOL));
            }
        }
    }

    /// Basis columns form the identity after every applied pivot
    #[test]
    fn identity_after_every_pivot(problem in problem_strategy()) {
        if let Some(engine) = run(problem) {
            for record in engine.log().iter().filter(|r| r.kind() == StepKind::PivotApplied) {
                prop_assert!(basis_is_identity(record), "step {}", record.index());
            }
        }
    }

    /// No objective-row entry is below -tolerance in an optimal record
    #[test]
    fn optimal_record_has_no_improving_column(problem in problem_strategy()) {
        if let Some(engine) = run(problem) {
            let last = engine.last_step().expect("non-empty log");
            if last.kind() == StepKind::Optimal {
                let tableau = last.tableau();
                let objective_row = tableau.row(tableau.rows() - 1);
                prop_assert!(objective_row[..tableau.cols() - 1].iter().all(|&v| v >= -TOL));
            }
        }
    }

    /// An unbounded record names an improving column with no positive entry
    #[test]
    fn unbounded_record_has_no_leaving_row(problem in problem_strategy()) {
        if let Some(engine) = run(problem) {
            let solution = engine.solution().expect("terminal engine");
            if let SolveStatus::Unbounded { entering_column } = solution.status {
                let last = engine.last_step().expect("non-empty log");
                prop_assert_eq!(last.kind(), StepKind::Unbounded);
                prop_assert_eq!(last.entering_column(), Some(entering_column));
                let tableau = last.tableau();
                let m = last.num_constraints();
                prop_assert!(tableau[(m, entering_column)] < -TOL);
                prop_assert!((0..m).all(|i| tableau[(i, entering_column)] <= TOL));
            }
        }
    }

    /// The objective never decreases across applied pivots
    #[test]
    fn objective_is_monotone(problem in problem_strategy()) {
        if let Some(engine) = run(problem) {
            let values: Vec<f64> = engine
                .log()
                .iter()
                .filter(|r| matches!(r.kind(), StepKind::Initial | StepKind::PivotApplied))
                .map(objective_of)
                .collect();
            for pair in values.windows(2) {
                let scale = pair[0].abs().max(1.0);
                prop_assert!(pair[1] >= pair[0] - CHECK_TOL * scale);
            }
        }
    }

    /// Right-hand sides stay non-negative, so every basis is feasible
    #[test]
    fn rhs_stays_nonnegative(problem in problem_strategy()) {
        if let Some(engine) = run(problem) {
            for record in engine.log() {
                let tableau = record.tableau();
                let rhs = tableau.cols() - 1;
                prop_assert!((0..record.num_constraints()).all(|i| tableau[(i, rhs)] >= -CHECK_TOL));
            }
        }
    }

    /// Reset followed by a full run reproduces the log exactly
    #[test]
    fn reset_reproduces_log(problem in problem_strategy()) {
        let mut engine = StepEngine::new(problem);
        let first = engine.run_to_completion().map(<[StepRecord]>::to_vec);
        engine.reset();
        let second = engine.run_to_completion().map(<[StepRecord]>::to_vec);
        prop_assert_eq!(first, second);
    }
}
