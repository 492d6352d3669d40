//! CLI argument definitions for the loan cleaner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use loan_model::{
    DEFAULT_CORRELATION_THRESHOLD, DEFAULT_IQR_MULTIPLIER, DEFAULT_MAX_NULL_FRACTION,
    DEFAULT_SKEW_THRESHOLD, ImputeStrategy, TransformKind,
};

#[derive(Parser)]
#[command(
    name = "loan-clean",
    version,
    about = "Clean, profile and analyse loan extracts",
    long_about = "Clean, profile and analyse loan extracts.\n\n\
                  Cleaning converts date and label columns, drops sparse columns,\n\
                  imputes nulls, corrects skewed numeric columns, removes outliers\n\
                  and prunes correlated columns."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean a loan extract and write the cleaned table.
    Clean(CleanArgs),

    /// Print dtypes, statistics, nulls and skewness of a table.
    Profile(ProfileArgs),

    /// Print recoveries, projected repayments and charge-off losses.
    Loans(LoansArgs),
}

#[derive(Parser)]
pub struct CleanArgs {
    /// Loan extract to clean.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Cleaned CSV path (default: <INPUT stem>_clean.csv next to INPUT).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write the cleaning report as JSON.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Columns to parse as dates (comma separated). Unparseable values become null.
    #[arg(long = "date-columns", value_delimiter = ',', value_name = "COLUMNS")]
    pub date_columns: Vec<String>,

    /// Columns to store as categorical labels (comma separated).
    #[arg(long = "categorical-columns", value_delimiter = ',', value_name = "COLUMNS")]
    pub categorical_columns: Vec<String>,

    /// Absolute skewness a numeric column must exceed to be transformed.
    #[arg(long = "skew-threshold", default_value_t = DEFAULT_SKEW_THRESHOLD)]
    pub skew_threshold: f64,

    /// Drop columns whose null fraction exceeds this value.
    #[arg(long = "max-null-fraction", default_value_t = DEFAULT_MAX_NULL_FRACTION)]
    pub max_null_fraction: f64,

    /// How remaining nulls are filled.
    #[arg(long = "impute", value_enum, default_value = "mean")]
    pub impute: ImputeArg,

    /// Candidate transformations (comma separated).
    #[arg(
        long = "candidates",
        value_enum,
        value_delimiter = ',',
        default_values = ["log1p", "sqrt", "boxcox"]
    )]
    pub candidates: Vec<TransformArg>,

    /// Tukey fence multiplier for outlier removal.
    #[arg(long = "iqr-multiplier", default_value_t = DEFAULT_IQR_MULTIPLIER)]
    pub iqr_multiplier: f64,

    /// Keep outlying rows.
    #[arg(long = "no-outliers")]
    pub no_outliers: bool,

    /// Absolute correlation above which one column of a pair is dropped.
    #[arg(long = "correlation-threshold", default_value_t = DEFAULT_CORRELATION_THRESHOLD)]
    pub correlation_threshold: f64,

    /// Keep highly correlated columns.
    #[arg(long = "no-correlation-pruning")]
    pub no_correlation_pruning: bool,

    /// Read only the first N rows.
    #[arg(long = "rows", value_name = "N")]
    pub rows: Option<usize>,
}

#[derive(Parser)]
pub struct ProfileArgs {
    /// Table to profile.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Read only the first N rows.
    #[arg(long = "rows", value_name = "N")]
    pub rows: Option<usize>,

    /// Print the profile as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct LoansArgs {
    /// Raw loan extract to analyse. Cleaned tables hold transformed amounts.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the report as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ImputeArg {
    Mean,
    Median,
    Mode,
}

impl From<ImputeArg> for ImputeStrategy {
    fn from(value: ImputeArg) -> Self {
        match value {
            ImputeArg::Mean => ImputeStrategy::Mean,
            ImputeArg::Median => ImputeStrategy::Median,
            ImputeArg::Mode => ImputeStrategy::Mode,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TransformArg {
    #[value(name = "log1p")]
    Log,
    Sqrt,
    Boxcox,
}

impl From<TransformArg> for TransformKind {
    fn from(value: TransformArg) -> Self {
        match value {
            TransformArg::Log => TransformKind::Logarithmic,
            TransformArg::Sqrt => TransformKind::SquareRoot,
            TransformArg::Boxcox => TransformKind::BoxCox,
        }
    }
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
