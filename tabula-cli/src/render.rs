//! Text, JSON and YAML rendering of the step log

use std::fmt::Write as _;

use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tabula_core::{LpProblem, Solution, SolveStatus, SolverStats, StepKind, StepRecord, Variable};

use crate::error::CliResult;

/// Machine-readable report for `--format json|yaml`
#[derive(Debug, Serialize)]
pub(crate) struct Report<'a> {
    /// Problem as solved
    pub problem: &'a LpProblem,
    /// Step log, present with `--steps`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<&'a [StepRecord]>,
    /// Terminal result
    pub solution: &'a Solution,
    /// Engine counters
    pub stats: &'a SolverStats,
}

impl Report<'_> {
    pub(crate) fn to_json(&self) -> CliResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn to_yaml(&self) -> CliResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Plain-text renderer for tableaus and results
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextRenderer {
    precision: usize,
    color: bool,
    tolerance: f64,
}

impl TextRenderer {
    pub(crate) fn new(precision: usize, color: bool, tolerance: f64) -> Self {
        Self {
            precision,
            color,
            tolerance,
        }
    }

    /// Format a number with the configured precision, trailing zeros removed
    pub(crate) fn number(&self, value: f64) -> String {
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_string();
        }
        let mut s = format!("{:.*}", self.precision, value);
        if s.contains('.') {
            let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
            s.truncate(trimmed);
        }
        if s == "-0" {
            s = "0".to_string();
        }
        s
    }

    fn paint_title(&self, text: &str) -> String {
        if self.color {
            text.if_supports_color(Stream::Stdout, |t| t.cyan()).to_string()
        } else {
            text.to_string()
        }
    }

    /// Pivot cells are bracketed when colors are off
    fn paint_pivot(&self, cell: &str, width: usize) -> String {
        if self.color {
            format!("{:>w$}", cell, w = width)
                .if_supports_color(Stream::Stdout, |t| t.yellow())
                .to_string()
        } else {
            format!("{:>w$}", format!("[{}]", cell), w = width)
        }
    }

    fn paint_status(&self, text: &str, optimal: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        if optimal {
            text.if_supports_color(Stream::Stdout, |t| t.green())
                .to_string()
        } else {
            text.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
        }
    }

    /// One-line description of a record
    pub(crate) fn headline(&self, record: &StepRecord) -> String {
        let label = |v: Option<Variable>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
        let body = match record.kind() {
            StepKind::Initial => "initial tableau".to_string(),
            StepKind::PivotSelected => format!(
                "pivot selected: {} enters, {} leaves",
                label(record.entering_variable()),
                label(record.leaving_variable())
            ),
            StepKind::PivotApplied => format!(
                "pivot applied: {} entered, {} left",
                label(record.entering_variable()),
                label(record.leaving_variable())
            ),
            StepKind::Optimal => "optimal".to_string(),
            StepKind::Unbounded => {
                format!("unbounded along {}", label(record.entering_variable()))
            }
        };
        format!(
            "Step {} (iteration {}): {}",
            record.index(),
            record.iteration(),
            body
        )
    }

    /// Row operations behind a `PivotApplied` record, one per line.
    ///
    /// Constraint rows are named `r1..rm` and the objective row `z`. Empty for
    /// every other record kind.
    pub(crate) fn row_operations(&self, record: &StepRecord) -> Vec<String> {
        let (Some(reduction), Some(cell)) = (record.reduction(), record.pivot()) else {
            return Vec::new();
        };
        let m = record.num_constraints();
        let name = |i: usize| if i == m { "z".to_string() } else { format!("r{}", i + 1) };
        let pivot_row = name(cell.row);
        let entering = Variable::from_column(cell.column, record.num_vars());

        let mut lines = vec![
            format!(
                "pivot element: {}, {} = {}",
                pivot_row,
                entering,
                self.number(reduction.divisor)
            ),
            format!("{} <- {} / {}", pivot_row, pivot_row, self.number(reduction.divisor)),
        ];
        for &(i, factor) in &reduction.eliminations {
            let row = name(i);
            let line = if factor == 0.0 {
                format!("{} unchanged", row)
            } else if factor > 0.0 {
                format!("{} <- {} - {} * {}", row, row, self.number(factor), pivot_row)
            } else {
                format!("{} <- {} + {} * {}", row, row, self.number(-factor), pivot_row)
            };
            lines.push(line);
        }
        lines
    }

    /// Render one record as a table.
    ///
    /// Rows are labelled with their basic variable and the objective row with
    /// `z`. `PivotSelected` records also show the minimum-ratio column, and
    /// `PivotApplied` records list their row operations before the table.
    pub(crate) fn record(&self, record: &StepRecord) -> String {
        let tableau = record.tableau();
        let n = record.num_vars();
        let m = record.num_constraints();
        let rhs = tableau.cols() - 1;
        let with_ratios = record.kind() == StepKind::PivotSelected;
        let ratios = if with_ratios {
            record.ratios(self.tolerance)
        } else {
            Vec::new()
        };

        let mut header = vec!["basis".to_string()];
        header.extend((0..rhs).map(|col| Variable::from_column(col, n).to_string()));
        header.push("rhs".to_string());
        if with_ratios {
            header.push("ratio".to_string());
        }

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(m + 1);
        for i in 0..=m {
            let label = match record.basic_variable(i) {
                Some(v) => v.to_string(),
                None => "z".to_string(),
            };
            let mut cells = vec![label];
            cells.extend(tableau.row(i).iter().map(|&v| self.number(v)));
            if with_ratios {
                let ratio = ratios.get(i).copied().flatten();
                cells.push(ratio.map_or_else(|| "-".to_string(), |r| self.number(r)));
            }
            rows.push(cells);
        }

        let widths: Vec<usize> = (0..header.len())
            .map(|c| {
                rows.iter()
                    .map(|r| r[c].len())
                    .chain(std::iter::once(header[c].len()))
                    .max()
                    .unwrap_or(0)
                    + 2
            })
            .collect();

        let mut out = String::new();
        out.push_str(&self.paint_title(&self.headline(record)));
        out.push('\n');
        for line in self.row_operations(record) {
            let _ = writeln!(out, "  {}", line);
        }
        for (c, h) in header.iter().enumerate() {
            let _ = write!(out, "{:>w$}", h, w = widths[c]);
        }
        out.push('\n');

        let pivot = record.pivot();
        for (i, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                // First cell is the basis label
                let is_pivot = c > 0 && pivot.is_some_and(|p| p.row == i && p.column == c - 1);
                if is_pivot {
                    out.push_str(&self.paint_pivot(cell, widths[c]));
                } else {
                    let _ = write!(out, "{:>w$}", cell, w = widths[c]);
                }
            }
            out.push('\n');
        }
        out
    }

    /// Final summary of a run
    pub(crate) fn summary(
        &self,
        problem: &LpProblem,
        solution: &Solution,
        stats: &SolverStats,
    ) -> String {
        let mut out = String::new();
        match solution.status {
            SolveStatus::Optimal => {
                let _ = writeln!(out, "Status: {}", self.paint_status("optimal", true));
                let _ = writeln!(out, "Objective: z = {}", self.number(solution.objective_value));
                for (j, &v) in solution.decision_values.iter().enumerate() {
                    let _ = writeln!(out, "  {} = {}", Variable::Decision(j), self.number(v));
                }
                for (k, &v) in solution.slack_values.iter().enumerate() {
                    let _ = writeln!(out, "  {} = {}", Variable::Slack(k), self.number(v));
                }
            }
            SolveStatus::Unbounded { entering_column } => {
                let _ = writeln!(out, "Status: {}", self.paint_status("unbounded", false));
                let _ = writeln!(
                    out,
                    "Objective grows without bound as {} increases",
                    Variable::from_column(entering_column, problem.num_vars())
                );
            }
        }
        let _ = writeln!(out, "Iterations: {}", stats.pivots);
        out
    }
}
