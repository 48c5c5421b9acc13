//! Configuration file handling

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabula_core::SolverConfig;
use tracing::warn;

use crate::error::{CliError, CliResult};
use crate::{Args, OutputFormat, Verbosity};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub(crate) struct CliConfig {
    /// Default verbosity level
    #[serde(default)]
    pub verbosity: Option<String>,
    /// Default output format
    #[serde(default)]
    pub format: Option<String>,
    /// Enable colors by default
    #[serde(default)]
    pub color: Option<bool>,
    /// Default number of decimals in text output
    #[serde(default)]
    pub precision: Option<usize>,
    /// Solver settings
    #[serde(default)]
    pub solver: Option<SolverConfig>,
}

impl CliConfig {
    /// Default location, `<config_dir>/tabula/config.yaml`
    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("tabula");
            p.push("config.yaml");
            p
        })
    }

    /// Load the configuration file from its default location.
    ///
    /// A missing file yields the defaults; an unreadable one is reported and
    /// ignored.
    pub(crate) fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring configuration file");
                Self::default()
            }
        }
    }

    /// Load an explicitly named configuration file
    pub(crate) fn load_from(path: &Path) -> CliResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Merge configuration with command-line arguments
    pub(crate) fn merge_with_args(&self, args: &mut Args) {
        // Only apply config if arg is not explicitly set
        if args.verbosity == Verbosity::Normal {
            if let Some(ref v) = self.verbosity {
                match v.as_str() {
                    "quiet" => args.verbosity = Verbosity::Quiet,
                    "verbose" => args.verbosity = Verbosity::Verbose,
                    "debug" => args.verbosity = Verbosity::Debug,
                    "trace" => args.verbosity = Verbosity::Trace,
                    _ => {}
                }
            }
        }

        if args.format == OutputFormat::Text {
            if let Some(ref f) = self.format {
                match f.as_str() {
                    "json" => args.format = OutputFormat::Json,
                    "yaml" => args.format = OutputFormat::Yaml,
                    _ => {}
                }
            }
        }

        if args.precision.is_none() {
            args.precision = self.precision;
        }

        if let Some(solver) = self.solver {
            args.tolerance.get_or_insert(solver.tolerance);
            args.max_iterations.get_or_insert(solver.max_iterations);
        }

        if self.color == Some(false) {
            args.no_color = true;
        }
    }
}
