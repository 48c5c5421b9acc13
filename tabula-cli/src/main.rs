//! tabula - replay the tableau simplex one decision at a time

mod config;
mod error;
mod input;
mod render;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use owo_colors::{OwoColorize, Stream};
use tabula_core::{LpProblem, SimplexError, SolveStatus, SolverConfig, StepEngine};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::CliConfig;
use error::{CliError, CliResult};
use render::{Report, TextRenderer};

/// Exit code for an unbounded problem
const EXIT_UNBOUNDED: i32 = 2;

/// Decimals shown in text output unless configured otherwise
const DEFAULT_PRECISION: usize = 4;

/// Output format for results
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable tables (default)
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Verbosity level
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity {
    /// No output except results
    Quiet,
    /// Minimal output
    Normal,
    /// Solver milestones
    Verbose,
    /// Every state transition
    Debug,
    /// Every row operation
    Trace,
}

/// Tableau simplex solver that shows its work
#[derive(Parser, Debug, Clone)]
#[command(name = "tabula")]
#[command(version)]
#[command(about = "Solve standard-form linear programs and replay every simplex step")]
struct Args {
    /// Problem file (.json, .yaml or .yml). Reads standard input if omitted.
    #[arg(value_name = "FILE", conflicts_with = "demo")]
    input: Option<PathBuf>,

    /// Solve the built-in three-product example
    #[arg(long)]
    demo: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Include every step record in the output
    #[arg(short, long)]
    steps: bool,

    /// Numerical tolerance for pivot selection
    #[arg(long, value_name = "T")]
    tolerance: Option<f64>,

    /// Maximum number of pivots before giving up
    #[arg(long, value_name = "N")]
    max_iterations: Option<usize>,

    /// Configuration file (default: <config dir>/tabula/config.yaml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Decimals shown in text output
    #[arg(short, long, value_name = "P")]
    precision: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value = "normal")]
    verbosity: Verbosity,

    /// Enable quiet mode (equivalent to --verbosity quiet)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::default();
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        config
    }
}

fn setup_logging(verbosity: Verbosity) -> CliResult<()> {
    let level = match verbosity {
        Verbosity::Quiet | Verbosity::Normal => return Ok(()),
        Verbosity::Verbose => Level::INFO,
        Verbosity::Debug => Level::DEBUG,
        Verbosity::Trace => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::Logging(e.to_string()))
}

fn load_input(args: &Args) -> CliResult<LpProblem> {
    if args.demo {
        input::demo_problem()
    } else if let Some(path) = &args.input {
        input::load_problem(path)
    } else {
        input::read_stdin()
    }
}

/// Solve and print, returning the process exit code
fn run(args: &Args) -> CliResult<i32> {
    let problem = load_input(args)?;
    let solver_config = args.solver_config();
    info!(
        vars = problem.num_vars(),
        constraints = problem.num_constraints(),
        tolerance = solver_config.tolerance,
        max_iterations = solver_config.max_iterations,
        "solving"
    );

    let mut engine = StepEngine::with_config(problem, solver_config)?;
    engine.run_to_completion()?;
    let solution = engine
        .solution()
        .ok_or(SimplexError::IterationLimitExceeded {
            limit: solver_config.max_iterations,
        })?;

    match args.format {
        OutputFormat::Text => {
            let renderer = TextRenderer::new(
                args.precision.unwrap_or(DEFAULT_PRECISION),
                !args.no_color,
                solver_config.tolerance,
            );
            println!("{}", engine.problem());
            if args.steps {
                for record in engine.log() {
                    println!();
                    print!("{}", renderer.record(record));
                }
            }
            println!();
            print!("{}", renderer.summary(engine.problem(), &solution, engine.stats()));
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let report = Report {
                problem: engine.problem(),
                steps: args.steps.then(|| engine.log()),
                solution: &solution,
                stats: engine.stats(),
            };
            let text = if args.format == OutputFormat::Json {
                report.to_json()?
            } else {
                report.to_yaml()?
            };
            println!("{}", text);
        }
    }

    Ok(match solution.status {
        SolveStatus::Optimal => 0,
        SolveStatus::Unbounded { .. } => EXIT_UNBOUNDED,
    })
}

fn eprintln_colored(args: &Args, text: &str) {
    if args.no_color {
        eprintln!("{}", text);
    } else {
        eprintln!("{}", text.if_supports_color(Stream::Stderr, |t| t.red()));
    }
}

fn main() {
    let mut args = Args::parse();

    // Load configuration file and merge with args
    let config = match &args.config {
        Some(path) => match CliConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln_colored(&args, &format!("Error: {}", e));
                std::process::exit(1);
            }
        },
        None => CliConfig::load(),
    };
    config.merge_with_args(&mut args);

    let verbosity = if args.quiet {
        Verbosity::Quiet
    } else {
        args.verbosity
    };

    if let Err(e) = setup_logging(verbosity) {
        eprintln_colored(&args, &e.to_string());
        std::process::exit(1);
    }

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln_colored(&args, &format!("Error: {}", e));
            std::process::exit(1);
        }
    }
}
