use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use loan_analytics::{LoanBookReport, TableProfile};
use loan_cli::pipeline::{clean_table, write_report};
use loan_cli::types::CleaningReport;
use loan_ingest::{IngestOptions, read_csv_table_with_options, write_csv_table};
use loan_model::CleaningOptions;

use crate::cli::{CleanArgs, LoansArgs, ProfileArgs};

/// Paths and report of a finished `clean` run.
#[derive(Debug)]
pub struct CleanResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report_path: Option<PathBuf>,
    pub report: CleaningReport,
}

pub fn run_clean(args: &CleanArgs) -> Result<CleanResult> {
    let span = info_span!("clean", input = %args.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let options = cleaning_options(args);
    let df = load(&args.input, args.rows)?;
    let cleaned = clean_table(&df, &options)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    write_csv_table(&cleaned.data, &output)
        .with_context(|| format!("write {}", output.display()))?;
    if let Some(path) = &args.report {
        write_report(&cleaned.report, path)?;
    }
    info!(
        output = %output.display(),
        duration_ms = start.elapsed().as_millis(),
        "clean complete"
    );

    Ok(CleanResult {
        input: args.input.clone(),
        output,
        report_path: args.report.clone(),
        report: cleaned.report,
    })
}

pub fn run_profile(args: &ProfileArgs) -> Result<TableProfile> {
    let df = load(&args.input, args.rows)?;
    TableProfile::from_frame(&df).with_context(|| format!("profile {}", args.input.display()))
}

pub fn run_loans(args: &LoansArgs) -> Result<LoanBookReport> {
    let df = load(&args.input, None)?;
    LoanBookReport::from_frame(&df).with_context(|| format!("analyse {}", args.input.display()))
}

fn load(path: &Path, rows: Option<usize>) -> Result<DataFrame> {
    let options = IngestOptions {
        n_rows: rows,
        ..IngestOptions::default()
    };
    read_csv_table_with_options(path, &options).with_context(|| format!("read {}", path.display()))
}

fn cleaning_options(args: &CleanArgs) -> CleaningOptions {
    let mut options = CleaningOptions {
        max_null_fraction: args.max_null_fraction,
        iqr_multiplier: Some(args.iqr_multiplier),
        correlation_threshold: Some(args.correlation_threshold),
        ..CleaningOptions::default()
    }
    .with_date_columns(args.date_columns.iter().cloned())
    .with_categorical_columns(args.categorical_columns.iter().cloned())
    .with_skew_threshold(args.skew_threshold)
    .with_impute_strategy(args.impute.into())
    .with_candidates(args.candidates.iter().map(|&kind| kind.into()));
    if args.no_outliers {
        options = options.without_outlier_removal();
    }
    if args.no_correlation_pruning {
        options = options.without_correlation_pruning();
    }
    options
}

/// `<dir>/<stem>_clean.csv` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    input.with_file_name(format!("{stem}_clean.csv"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use loan_model::TransformKind;

    use super::*;
    use crate::cli::{Cli, Command};

    fn clean_args(args: &[&str]) -> CleanArgs {
        let cli = Cli::try_parse_from(["loan-clean", "clean", "loans.csv"].iter().chain(args).copied())
            .expect("parse arguments");
        match cli.command {
            Command::Clean(args) => args,
            _ => panic!("expected the clean command"),
        }
    }

    #[test]
    fn conversion_columns_reach_the_options() {
        let args = clean_args(&[
            "--date-columns",
            "issue_date,last_payment_date",
            "--categorical-columns",
            "grade",
            "--no-outliers",
        ]);
        let options = cleaning_options(&args);
        assert_eq!(options.date_columns, ["issue_date", "last_payment_date"]);
        assert_eq!(options.categorical_columns, ["grade"]);
        assert_eq!(options.iqr_multiplier, None);
        assert!(options.correlation_threshold.is_some());
    }

    #[test]
    fn defaults_convert_nothing() {
        let options = cleaning_options(&clean_args(&[]));
        assert!(options.date_columns.is_empty());
        assert!(options.categorical_columns.is_empty());
        assert_eq!(options.candidates, TransformKind::ALL);
    }

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("data/loan_payments.csv")),
            PathBuf::from("data/loan_payments_clean.csv")
        );
    }
}
