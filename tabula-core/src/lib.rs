//! # tabula-core
//!
//! Tableau simplex for standard-form linear programs
//!
//! ```text
//! maximize c · x   subject to   A x <= b,  x >= 0,  b >= 0
//! ```
//!
//! where every elementary decision of the algorithm is an observable step.
//! A [`StepEngine`] owns one tableau and moves through an explicit state
//! machine; each [`StepEngine::advance`] call chooses a pivot, applies it, or
//! detects termination, and appends immutable [`StepRecord`] snapshots to a
//! log that a renderer can replay without touching engine internals.
//!
//! ## Components
//!
//! - [`TableauState`]: the `(m + 1) x (n + m + 1)` matrix and basis mapping
//! - [`select_column`] / [`select_row`]: Dantzig's rule and the
//!   minimum-ratio test, lowest index on ties
//! - [`apply_pivot`]: Gauss-Jordan row reduction around a pivot cell
//! - [`StepEngine`]: the resumable driver and its step log
//! - [`Solution`]: values read off a terminal tableau
//!
//! ## Example
//!
//! ```
//! use tabula_core::{LpProblem, StepEngine, StepKind};
//!
//! // maximize 40x1 + 30x2 + 20x3
//! let problem = LpProblem::new(
//!     vec![40.0, 30.0, 20.0],
//!     vec![
//!         vec![2.0, 5.0, 10.0],
//!         vec![2.0, 5.0, 1.0],
//!         vec![4.0, 2.0, 2.0],
//!     ],
//!     vec![900.0, 400.0, 600.0],
//! )?;
//!
//! let mut engine = StepEngine::new(problem);
//! let first = engine.advance()?;
//! assert_eq!(first[0].kind(), StepKind::PivotSelected);
//!
//! engine.run_to_completion()?;
//! let solution = engine.solution().expect("terminal state");
//! assert_eq!(solution.decision_values, vec![137.5, 25.0, 0.0]);
//! assert!((solution.objective_value - 6250.0).abs() < 1e-9);
//! # Ok::<(), tabula_core::SimplexError>(())
//! ```
//!
//! ## Limitations
//!
//! Only `<=` constraints with non-negative right-hand sides are accepted, so
//! the slack basis is always a feasible start and there is no phase one.
//! Degenerate ties are broken by lowest index with no anti-cycling rule;
//! [`SolverConfig::max_iterations`] bounds
//! [`StepEngine::run_to_completion`] instead.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod pivot;
pub mod problem;
pub mod select;
pub mod solution;
pub mod tableau;
pub mod variable;

pub use config::SolverConfig;
pub use engine::{solve, AlgorithmState, SolverStats, StepEngine, StepKind, StepRecord};
pub use error::{SimplexError, SimplexResult};
pub use pivot::{apply_pivot, RowReduction};
pub use problem::LpProblem;
pub use select::{select_column, select_row, PivotCell};
pub use solution::{extract_optimal, extract_unbounded, SolveStatus, Solution};
pub use tableau::{Matrix, TableauState};
pub use variable::Variable;
