//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "split-column",
    version,
    about = "Split one delimited CSV column into several typed columns",
    long_about = "Split one delimited text column into several typed columns.\n\n\
                  Input layout, target column, delimiter, output columns and the mismatch\n\
                  policy are read from a JSON job file. Every other column passes through."
)]
pub struct Cli {
    /// JSON job file (input_columns + split settings).
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: PathBuf,

    /// Input CSV file (with header row).
    #[arg(long = "input", short = 'i', value_name = "PATH")]
    pub input: PathBuf,

    /// Output CSV file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
