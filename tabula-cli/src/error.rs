//! Error type for the command-line driver

use std::io;
use std::path::PathBuf;

use tabula_core::SimplexError;
use thiserror::Error;

/// Failures surfaced by the `tabula` binary
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Reading an input or configuration file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// Reading standard input failed
    #[error("Failed to read standard input: {0}")]
    Stdin(#[from] io::Error),
    /// JSON input could not be parsed, or a report could not be written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML input or configuration could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Input file extension is not recognized
    #[error("Unsupported input format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
    /// The solver rejected the problem or stopped early
    #[error(transparent)]
    Solver(#[from] SimplexError),
    /// The tracing subscriber could not be installed
    #[error("Failed to set tracing subscriber: {0}")]
    Logging(String),
}

/// Result type for the command-line driver
pub(crate) type CliResult<T> = Result<T, CliError>;
