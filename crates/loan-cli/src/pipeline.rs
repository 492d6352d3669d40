//! Table cleaning pipeline with explicit stages.
//!
//! The pipeline runs these stages in order:
//! 1. **Convert**: cast named columns to dates or categorical labels
//! 2. **Sparse columns**: drop columns with too many nulls
//! 3. **Impute**: fill the remaining nulls
//! 4. **Skew**: measure skewness and transform skewed numeric columns
//! 5. **Outliers**: drop rows outside the IQR fences (optional)
//! 6. **Correlation**: drop one column of each highly correlated pair (optional)
//!
//! Each stage takes the table produced by the previous one.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use loan_analytics::shape;
use loan_model::CleaningOptions;
use loan_transform::{
    SkewCorrection, SkewnessReport, convert_to_categorical, convert_to_date, drop_sparse_columns,
    impute, prune_correlated, remove_outliers,
};

use crate::types::{CleanedTable, CleaningReport};

/// Run every cleaning stage on `df`.
pub fn clean_table(df: &DataFrame, options: &CleaningOptions) -> Result<CleanedTable> {
    options.validate().context("invalid cleaning options")?;
    let input_shape = shape(df);
    let pipeline_start = Instant::now();

    let (df, converted) = info_span!("stage", name = "convert").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let (df, mut converted) =
            convert_to_date(df, &options.date_columns).context("convert date columns")?;
        let (df, labels) = convert_to_categorical(&df, &options.categorical_columns)
            .context("convert categorical columns")?;
        converted.extend(labels);
        debug!(
            columns = converted.len(),
            duration_ms = start.elapsed().as_millis(),
            "column conversion complete"
        );
        Ok((df, converted))
    })?;

    let (df, dropped_sparse) = info_span!("stage", name = "sparse_columns").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let (df, dropped) = drop_sparse_columns(&df, options.max_null_fraction)
            .context("drop sparse columns")?;
        debug!(
            dropped = dropped.len(),
            duration_ms = start.elapsed().as_millis(),
            "sparse columns dropped"
        );
        Ok((df, dropped))
    })?;

    let (df, imputed) = info_span!("stage", name = "impute").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let (df, imputed) = impute(&df, options.impute_strategy).context("impute nulls")?;
        debug!(
            strategy = options.impute_strategy.as_str(),
            columns = imputed.len(),
            duration_ms = start.elapsed().as_millis(),
            "imputation complete"
        );
        Ok((df, imputed))
    })?;

    let (df, skewness, transformed) = info_span!("stage", name = "skew").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let skewness = SkewnessReport::from_frame(&df).context("measure skewness")?;
        let (df, transformed) = SkewCorrection::from_options(options)
            .run(&df)
            .context("correct skewed columns")?;
        debug!(
            measured = skewness.len(),
            transformed = transformed.len(),
            duration_ms = start.elapsed().as_millis(),
            "skew correction complete"
        );
        Ok((df, skewness, transformed))
    })?;

    let (df, outliers) = match options.iqr_multiplier {
        Some(multiplier) => info_span!("stage", name = "outliers").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let rows = df.height();
            let (df, records) =
                remove_outliers(&df, multiplier).context("remove outliers")?;
            debug!(
                removed = rows - df.height(),
                duration_ms = start.elapsed().as_millis(),
                "outlier removal complete"
            );
            Ok((df, records))
        })?,
        None => (df, Vec::new()),
    };

    let before: Vec<String> = column_names(&df);
    let (df, correlated) = match options.correlation_threshold {
        Some(threshold) => info_span!("stage", name = "correlation").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let (df, pairs) =
                prune_correlated(&df, threshold).context("prune correlated columns")?;
            debug!(
                pairs = pairs.len(),
                duration_ms = start.elapsed().as_millis(),
                "correlation pruning complete"
            );
            Ok((df, pairs))
        })?,
        None => (df, Vec::new()),
    };
    let kept = column_names(&df);
    let dropped_correlated: Vec<String> =
        before.into_iter().filter(|name| !kept.contains(name)).collect();

    let report = CleaningReport {
        options: options.clone(),
        input_shape,
        output_shape: shape(&df),
        converted,
        dropped_sparse,
        imputed,
        skewness,
        transformed,
        outliers,
        correlated,
        dropped_correlated,
    };
    info!(
        rows = report.output_shape.rows,
        columns = report.output_shape.columns,
        transformed = report.transformed.len(),
        duration_ms = pipeline_start.elapsed().as_millis(),
        "cleaning complete"
    );
    Ok(CleanedTable { data: df, report })
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Write the cleaning report as pretty JSON.
pub fn write_report(report: &CleaningReport, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
