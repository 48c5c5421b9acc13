//! Resumable simplex driver.
//!
//! [`StepEngine`] runs the tableau simplex as an explicit state machine. Each
//! call to [`StepEngine::advance`] performs one observable unit of work and
//! appends snapshots to an append-only step log:
//!
//! ```text
//! Initialized --advance--> PivotPending(cell) --advance--> PivotPending(next)
//!      |                        |                               ...
//!      +--> Optimal             +--> Optimal
//!      +--> Unbounded           +--> Unbounded
//! ```
//!
//! Leaving `Initialized` records the pivot choice only. Every later call first
//! applies the pending pivot (`PivotApplied`) and then records the next
//! decision (`PivotSelected`, `Optimal` or `Unbounded`) in the same call.
//! Terminal states ignore further calls.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SolverConfig;
use crate::error::{SimplexError, SimplexResult};
use crate::pivot::{apply_pivot, RowReduction};
use crate::problem::LpProblem;
use crate::select::{select_pivot, PivotCell, Selection};
use crate::solution::{extract_optimal, extract_unbounded, Solution};
use crate::tableau::{Matrix, TableauState};
use crate::variable::Variable;

/// State of a [`StepEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AlgorithmState {
    /// Freshly built tableau, no pivot chosen yet
    Initialized,
    /// Pivot chosen but not yet applied
    PivotPending {
        /// The chosen cell
        cell: PivotCell,
    },
    /// No improving column remains
    Optimal,
    /// Improving column without a leaving row
    Unbounded {
        /// Entering column
        column: usize,
    },
}

impl AlgorithmState {
    /// Whether further `advance` calls are no-ops
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Optimal | Self::Unbounded { .. })
    }
}

/// Kind of a step record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Tableau as constructed
    Initial,
    /// A pivot cell was chosen, tableau unchanged
    PivotSelected,
    /// The pending pivot was applied
    PivotApplied,
    /// Optimality reached
    Optimal,
    /// Unboundedness detected
    Unbounded,
}

/// Immutable snapshot appended to the step log.
///
/// Records are built by [`StepEngine`]. A deserialized record is checked for
/// consistent dimensions and in-range column and row indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStepRecord")]
pub struct StepRecord {
    index: usize,
    iteration: usize,
    kind: StepKind,
    tableau: Matrix,
    basis: Vec<usize>,
    pivot: Option<PivotCell>,
    entering: Option<usize>,
    leaving: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reduction: Option<RowReduction>,
    num_vars: usize,
}

#[derive(Deserialize)]
struct RawStepRecord {
    index: usize,
    iteration: usize,
    kind: StepKind,
    tableau: Matrix,
    basis: Vec<usize>,
    pivot: Option<PivotCell>,
    entering: Option<usize>,
    leaving: Option<usize>,
    #[serde(default)]
    reduction: Option<RowReduction>,
    num_vars: usize,
}

impl TryFrom<RawStepRecord> for StepRecord {
    type Error = String;

    fn try_from(raw: RawStepRecord) -> Result<Self, Self::Error> {
        let m = raw.basis.len();
        let width = raw.num_vars + m;
        if raw.tableau.rows() != m + 1 {
            return Err(format!(
                "tableau has {} rows, expected {} for {} basis entries",
                raw.tableau.rows(),
                m + 1,
                m
            ));
        }
        if raw.tableau.cols() != width + 1 {
            return Err(format!(
                "tableau has {} columns, expected {}",
                raw.tableau.cols(),
                width + 1
            ));
        }
        if let Some(&col) = raw.basis.iter().find(|&&col| col >= width) {
            return Err(format!("basis column {} out of range", col));
        }
        for col in [raw.entering, raw.leaving].into_iter().flatten() {
            if col >= width {
                return Err(format!("variable column {} out of range", col));
            }
        }
        if let Some(cell) = raw.pivot {
            if cell.row >= m || cell.column >= width {
                return Err(format!(
                    "pivot cell (row {}, column {}) out of range",
                    cell.row, cell.column
                ));
            }
        }
        if let Some(reduction) = &raw.reduction {
            if let Some(&(row, _)) = reduction.eliminations.iter().find(|(row, _)| *row > m) {
                return Err(format!("elimination row {} out of range", row));
            }
        }
        Ok(Self {
            index: raw.index,
            iteration: raw.iteration,
            kind: raw.kind,
            tableau: raw.tableau,
            basis: raw.basis,
            pivot: raw.pivot,
            entering: raw.entering,
            leaving: raw.leaving,
            reduction: raw.reduction,
            num_vars: raw.num_vars,
        })
    }
}

impl StepRecord {
    /// Position in the step log
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Pivots applied when the snapshot was taken
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Record kind
    #[must_use]
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Tableau snapshot, `(m + 1) x (n + m + 1)`
    #[must_use]
    pub fn tableau(&self) -> &Matrix {
        &self.tableau
    }

    /// Basis snapshot
    #[must_use]
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    /// Pivot cell for `PivotSelected` and `PivotApplied` records
    #[must_use]
    pub fn pivot(&self) -> Option<PivotCell> {
        self.pivot
    }

    /// Entering column, also set for `Unbounded` records
    #[must_use]
    pub fn entering_column(&self) -> Option<usize> {
        self.entering
    }

    /// Row operations of a `PivotApplied` record
    #[must_use]
    pub fn reduction(&self) -> Option<&RowReduction> {
        self.reduction.as_ref()
    }

    /// Number of decision variables of the recorded problem
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of constraint rows of the recorded problem
    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.basis.len()
    }

    /// Variable entering the basis
    #[must_use]
    pub fn entering_variable(&self) -> Option<Variable> {
        self.entering
            .map(|col| Variable::from_column(col, self.num_vars))
    }

    /// Variable leaving the basis at the pivot row
    #[must_use]
    pub fn leaving_variable(&self) -> Option<Variable> {
        self.leaving
            .map(|col| Variable::from_column(col, self.num_vars))
    }

    /// Variable basic in a constraint row of this snapshot
    #[must_use]
    pub fn basic_variable(&self, row: usize) -> Option<Variable> {
        self.basis
            .get(row)
            .map(|&col| Variable::from_column(col, self.num_vars))
    }

    /// Minimum-ratio entries for the entering column, one per constraint row.
    ///
    /// Empty when the record has no entering column.
    #[must_use]
    pub fn ratios(&self, tolerance: f64) -> Vec<Option<f64>> {
        let Some(col) = self.entering else {
            return Vec::new();
        };
        let rhs = self.tableau.cols() - 1;
        (0..self.basis.len())
            .map(|i| {
                let coeff = self.tableau[(i, col)];
                (coeff > tolerance).then(|| self.tableau[(i, rhs)] / coeff)
            })
            .collect()
    }
}

/// Counters for one engine run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    /// `advance` calls that did work
    pub advances: u64,
    /// Pivots applied
    pub pivots: u64,
    /// Entering-column searches
    pub column_selections: u64,
    /// Minimum-ratio tests
    pub ratio_tests: u64,
}

/// Steppable tableau simplex for one problem.
///
/// The engine owns its tableau exclusively; independent problems need
/// independent engines.
#[derive(Debug, Clone)]
pub struct StepEngine {
    problem: LpProblem,
    config: SolverConfig,
    tableau: TableauState,
    state: AlgorithmState,
    log: Vec<StepRecord>,
    stats: SolverStats,
}

impl StepEngine {
    /// Create an engine with the default configuration.
    ///
    /// The log starts with the `Initial` record.
    #[must_use]
    pub fn new(problem: LpProblem) -> Self {
        let tableau = TableauState::new(&problem);
        let mut engine = Self {
            problem,
            config: SolverConfig::default(),
            tableau,
            state: AlgorithmState::Initialized,
            log: Vec::new(),
            stats: SolverStats::default(),
        };
        engine.record(StepKind::Initial, None, None);
        engine
    }

    /// Create an engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// [`SimplexError::InvalidConfig`] if the configuration does not validate.
    pub fn with_config(problem: LpProblem, config: SolverConfig) -> SimplexResult<Self> {
        config.validate()?;
        let mut engine = Self::new(problem);
        engine.config = config;
        Ok(engine)
    }

    /// Problem being solved
    #[must_use]
    pub fn problem(&self) -> &LpProblem {
        &self.problem
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Current tableau
    #[must_use]
    pub fn tableau(&self) -> &TableauState {
        &self.tableau
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> AlgorithmState {
        self.state
    }

    /// Whether a terminal state was reached
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Pivot chosen but not yet applied
    #[must_use]
    pub fn pending_pivot(&self) -> Option<PivotCell> {
        match self.state {
            AlgorithmState::PivotPending { cell } => Some(cell),
            _ => None,
        }
    }

    /// Full step log
    #[must_use]
    pub fn log(&self) -> &[StepRecord] {
        &self.log
    }

    /// Most recent record
    #[must_use]
    pub fn last_step(&self) -> Option<&StepRecord> {
        self.log.last()
    }

    /// Run counters
    #[must_use]
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Consume the engine and keep its log
    #[must_use]
    pub fn into_log(self) -> Vec<StepRecord> {
        self.log
    }

    /// Perform one step and return the records it appended.
    ///
    /// Returns an empty slice once the engine is terminal.
    ///
    /// # Errors
    ///
    /// [`SimplexError::DegeneratePivotElement`] if the pending pivot cannot
    /// be applied. Nothing is recorded and the solve must be abandoned.
    pub fn advance(&mut self) -> SimplexResult<&[StepRecord]> {
        if self.is_terminal() {
            return Ok(&[]);
        }
        let start = self.log.len();

        match self.state {
            AlgorithmState::Optimal
            | AlgorithmState::Unbounded { .. }
            | AlgorithmState::Initialized => {}
            AlgorithmState::PivotPending { cell } => {
                let leaving = self.tableau.basis()[cell.row];
                let reduction = apply_pivot(&mut self.tableau, cell, self.config.tolerance)?;
                self.stats.pivots += 1;
                debug!(
                    iteration = self.stats.pivots,
                    entering = %self.tableau.variable(cell.column),
                    leaving = %self.tableau.variable(leaving),
                    objective = self.tableau.objective_value(),
                    "pivot applied"
                );
                self.push(
                    StepKind::PivotApplied,
                    Some(cell),
                    Some(cell.column),
                    Some(leaving),
                    Some(reduction),
                );
            }
        }

        self.stats.advances += 1;
        self.search();
        Ok(&self.log[start..])
    }

    /// Column and row search from the current tableau, recording the outcome.
    fn search(&mut self) {
        self.stats.column_selections += 1;
        let selection = select_pivot(&self.tableau, self.config.tolerance);
        if !matches!(selection, Selection::Optimal) {
            self.stats.ratio_tests += 1;
        }

        match selection {
            Selection::Optimal => {
                info!(
                    iterations = self.stats.pivots,
                    objective = self.tableau.objective_value(),
                    "optimal tableau reached"
                );
                self.state = AlgorithmState::Optimal;
                self.record(StepKind::Optimal, None, None);
            }
            Selection::Unbounded { column } => {
                info!(
                    iterations = self.stats.pivots,
                    entering = %self.tableau.variable(column),
                    "objective is unbounded"
                );
                self.state = AlgorithmState::Unbounded { column };
                self.record_unbounded(column);
            }
            Selection::Pivot(cell) => {
                let leaving = self.tableau.basis()[cell.row];
                debug!(
                    column = cell.column,
                    row = cell.row,
                    entering = %self.tableau.variable(cell.column),
                    leaving = %self.tableau.variable(leaving),
                    ratio = self.tableau.rhs(cell.row) / self.tableau.value(cell.row, cell.column),
                    "pivot selected"
                );
                self.state = AlgorithmState::PivotPending { cell };
                self.record(StepKind::PivotSelected, Some(cell), Some(leaving));
            }
        }
    }

    /// Advance until a terminal state and return the whole log.
    ///
    /// # Errors
    ///
    /// - [`SimplexError::IterationLimitExceeded`] once `max_iterations`
    ///   pivots were applied without reaching a terminal state. The engine
    ///   stops with the next pivot still pending.
    /// - Any error from [`advance`](Self::advance).
    pub fn run_to_completion(&mut self) -> SimplexResult<&[StepRecord]> {
        let limit = self.config.max_iterations;
        while !self.is_terminal() {
            if self.pending_pivot().is_some() && self.stats.pivots >= limit as u64 {
                warn!(limit, "iteration limit reached before a terminal state");
                return Err(SimplexError::IterationLimitExceeded { limit });
            }
            self.advance()?;
        }
        Ok(&self.log)
    }

    /// Result of a finished run, `None` before a terminal state.
    #[must_use]
    pub fn solution(&self) -> Option<Solution> {
        match self.state {
            AlgorithmState::Optimal => Some(extract_optimal(&self.tableau)),
            AlgorithmState::Unbounded { column } => Some(extract_unbounded(column)),
            AlgorithmState::Initialized | AlgorithmState::PivotPending { .. } => None,
        }
    }

    /// Restore the initial tableau and restart the log.
    pub fn reset(&mut self) {
        debug!("engine reset");
        self.tableau = TableauState::new(&self.problem);
        self.state = AlgorithmState::Initialized;
        self.log.clear();
        self.stats = SolverStats::default();
        self.record(StepKind::Initial, None, None);
    }

    fn record(&mut self, kind: StepKind, pivot: Option<PivotCell>, leaving: Option<usize>) {
        let entering = pivot.map(|p| p.column);
        self.push(kind, pivot, entering, leaving, None);
    }

    fn record_unbounded(&mut self, column: usize) {
        self.push(StepKind::Unbounded, None, Some(column), None, None);
    }

    fn push(
        &mut self,
        kind: StepKind,
        pivot: Option<PivotCell>,
        entering: Option<usize>,
        leaving: Option<usize>,
        reduction: Option<RowReduction>,
    ) {
        self.log.push(StepRecord {
            index: self.log.len(),
            iteration: self.stats.pivots as usize,
            kind,
            tableau: self.tableau.matrix().clone(),
            basis: self.tableau.basis().to_vec(),
            pivot,
            entering,
            leaving,
            reduction,
            num_vars: self.tableau.num_vars(),
        });
    }
}

/// Solve a problem in one call.
///
/// # Errors
///
/// Configuration, pivot and iteration-limit errors from [`StepEngine`].
pub fn solve(problem: LpProblem, config: &SolverConfig) -> SimplexResult<Solution> {
    let mut engine = StepEngine::with_config(problem, *config)?;
    engine.run_to_completion()?;
    // A completed run is always terminal
    engine
        .solution()
        .ok_or(SimplexError::IterationLimitExceeded {
            limit: config.max_iterations,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> LpProblem {
        LpProblem::new(vec![1.0], vec![vec![1.0]], vec![10.0]).expect("valid problem")
    }

    #[test]
    fn test_initial_record() {
        let engine = StepEngine::new(single());
        assert_eq!(engine.state(), AlgorithmState::Initialized);
        assert_eq!(engine.log().len(), 1);
        let first = &engine.log()[0];
        assert_eq!(first.kind(), StepKind::Initial);
        assert_eq!(first.pivot(), None);
        assert_eq!(first.basis(), &[1]);
        assert_eq!(first.index(), 0);
    }

    #[test]
    fn test_first_advance_only_selects() {
        let mut engine = StepEngine::new(single());
        let steps = engine.advance().expect("advance");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind(), StepKind::PivotSelected);
        assert_eq!(steps[0].pivot(), Some(PivotCell::new(0, 0)));
        assert_eq!(steps[0].tableau().row(1), &[-1.0, 0.0, 0.0]);
        assert_eq!(steps[0].entering_variable(), Some(Variable::Decision(0)));
        assert_eq!(steps[0].leaving_variable(), Some(Variable::Slack(0)));
        assert_eq!(steps[0].ratios(1e-9), vec![Some(10.0)]);
        assert_eq!(engine.pending_pivot(), Some(PivotCell::new(0, 0)));
    }

    #[test]
    fn test_second_advance_applies_and_finishes() {
        let mut engine = StepEngine::new(single());
        engine.advance().expect("select");
        let steps = engine.advance().expect("apply");
        let kinds: Vec<StepKind> = steps.iter().map(StepRecord::kind).collect();
        assert_eq!(kinds, vec![StepKind::PivotApplied, StepKind::Optimal]);
        assert_eq!(steps[0].iteration(), 1);
        assert!(engine.is_terminal());

        let solution = engine.solution().expect("terminal");
        assert_eq!(solution.decision_values, vec![10.0]);
        assert_eq!(solution.objective_value, 10.0);
    }

    #[test]
    fn test_terminal_advance_is_noop() {
        let mut engine = StepEngine::new(single());
        engine.run_to_completion().expect("solve");
        let len = engine.log().len();
        let stats = *engine.stats();
        assert!(engine.advance().expect("noop").is_empty());
        assert_eq!(engine.log().len(), len);
        assert_eq!(*engine.stats(), stats);
    }

    #[test]
    fn test_unbounded_on_first_advance() {
        let problem = LpProblem::new(vec![1.0], vec![vec![0.0]], vec![0.0]).expect("valid problem");
        let mut engine = StepEngine::new(problem);
        let steps = engine.advance().expect("advance");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind(), StepKind::Unbounded);
        assert_eq!(steps[0].entering_column(), Some(0));
        assert_eq!(steps[0].pivot(), None);
        assert_eq!(engine.state(), AlgorithmState::Unbounded { column: 0 });
        assert!(!engine.solution().expect("terminal").is_optimal());
    }

    #[test]
    fn test_no_solution_before_terminal() {
        let mut engine = StepEngine::new(single());
        assert!(engine.solution().is_none());
        engine.advance().expect("select");
        assert!(engine.solution().is_none());
    }

    #[test]
    fn test_iteration_limit() {
        let problem = LpProblem::new(
            vec![40.0, 30.0, 20.0],
            vec![
                vec![2.0, 5.0, 10.0],
                vec![2.0, 5.0, 1.0],
                vec![4.0, 2.0, 2.0],
            ],
            vec![900.0, 400.0, 600.0],
        )
        .expect("valid problem");
        let config = SolverConfig::default().with_max_iterations(1);
        let mut engine = StepEngine::with_config(problem, config).expect("valid config");
        let err = engine.run_to_completion().expect_err("needs two pivots");
        assert_eq!(err, SimplexError::IterationLimitExceeded { limit: 1 });
        assert_eq!(engine.stats().pivots, 1);
        assert!(engine.pending_pivot().is_some());
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut engine = StepEngine::new(single());
        let first: Vec<StepRecord> = engine.run_to_completion().expect("solve").to_vec();
        engine.reset();
        assert_eq!(engine.log().len(), 1);
        assert_eq!(engine.state(), AlgorithmState::Initialized);
        let second = engine.run_to_completion().expect("solve again");
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig::default().with_max_iterations(0);
        assert!(matches!(
            StepEngine::with_config(single(), config),
            Err(SimplexError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_stats() {
        let mut engine = StepEngine::new(single());
        engine.run_to_completion().expect("solve");
        let stats = engine.stats();
        assert_eq!(stats.pivots, 1);
        assert_eq!(stats.advances, 2);
        assert_eq!(stats.column_selections, 2);
        assert_eq!(stats.ratio_tests, 1);
    }

    #[test]
    fn test_applied_record_keeps_row_operations() {
        let mut engine = StepEngine::new(single());
        engine.advance().expect("select");
        let steps = engine.advance().expect("apply");
        let reduction = steps[0].reduction().expect("applied record");
        assert_eq!(reduction.divisor, 1.0);
        assert_eq!(reduction.eliminations, vec![(1, -1.0)]);
        assert!(steps[1].reduction().is_none());
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_record() {
        // Basis claims three rows but the tableau has one constraint row
        let json = r#"{"index":1,"iteration":0,"kind":"pivot_selected",
            "tableau":[[1.0,1.0,10.0],[-1.0,0.0,0.0]],"basis":[1,0,0],
            "pivot":{"column":0,"row":0},"entering":0,"leaving":1,"num_vars":1}"#;
        assert!(serde_json::from_str::<StepRecord>(json).is_err());

        let json = r#"{"index":1,"iteration":0,"kind":"pivot_selected",
            "tableau":[[1.0,1.0,10.0],[-1.0,0.0,0.0]],"basis":[1],
            "pivot":{"column":0,"row":0},"entering":7,"leaving":1,"num_vars":1}"#;
        assert!(serde_json::from_str::<StepRecord>(json).is_err());

        let json = r#"{"index":1,"iteration":0,"kind":"pivot_selected",
            "tableau":[[1.0,1.0,10.0],[-1.0,0.0,0.0]],"basis":[1],
            "pivot":{"column":0,"row":0},"entering":0,"leaving":1,"num_vars":1}"#;
        let record: StepRecord = serde_json::from_str(json).expect("consistent record");
        assert_eq!(record.ratios(1e-9), vec![Some(10.0)]);
    }

    #[test]
    fn test_solve_helper() {
        let solution = solve(single(), &SolverConfig::default()).expect("solve");
        assert!(solution.is_optimal());
        assert_eq!(solution.slack_values, vec![0.0]);
    }
}
