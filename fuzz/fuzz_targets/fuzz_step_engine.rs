//! Fuzz target for the step engine
//!
//! Drives random small problems to completion and checks the terminal
//! record against the tableau invariants

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tabula_core::{LpProblem, SimplexError, SolverConfig, StepEngine, StepKind};

#[derive(Debug, Arbitrary)]
struct FuzzProblem {
    num_vars: u8,
    num_constraints: u8,
    objective: Vec<i8>,
    coefficients: Vec<i8>,
    limits: Vec<u8>,
    manual_steps: u8,
}

fn pick<T: Copy + Default>(values: &[T], i: usize) -> T {
    if values.is_empty() {
        T::default()
    } else {
        values[i % values.len()]
    }
}

fuzz_target!(|input: FuzzProblem| {
    let n = 1 + (input.num_vars % 6) as usize;
    let m = 1 + (input.num_constraints % 6) as usize;

    let objective = (0..n).map(|j| f64::from(pick(&input.objective, j))).collect();
    let constraints = (0..m)
        .map(|i| {
            (0..n)
                .map(|j| f64::from(pick(&input.coefficients, i * n + j)))
                .collect()
        })
        .collect();
    let limits = (0..m).map(|i| f64::from(pick(&input.limits, i))).collect();

    let problem = match LpProblem::new(objective, constraints, limits) {
        Ok(p) => p,
        Err(_) => return,
    };

    let config = SolverConfig::default().with_max_iterations(200);
    let mut engine = match StepEngine::with_config(problem.clone(), config) {
        Ok(e) => e,
        Err(_) => return,
    };

    // Some manual steps before the batch run
    for _ in 0..input.manual_steps % 4 {
        if engine.advance().is_err() {
            return;
        }
    }

    match engine.run_to_completion() {
        Ok(_) => {}
        Err(SimplexError::IterationLimitExceeded { .. }) => return,
        Err(e) => panic!("unexpected error: {e}"),
    }

    for record in engine.log() {
        if record.kind() == StepKind::PivotApplied {
            let tableau = record.tableau();
            for (i, &col) in record.basis().iter().enumerate() {
                for k in 0..m {
                    let expected = if k == i { 1.0 } else { 0.0 };
                    assert!((tableau[(k, col)] - expected).abs() < 1e-6);
                }
            }
        }
    }

    if let Some(solution) = engine.solution() {
        if solution.is_optimal() {
            assert!(solution.satisfies(&problem, 1e-6));
        }
    }
});
