//! Result types of a cleaning run.

use polars::prelude::DataFrame;
use serde::Serialize;

use loan_analytics::Shape;
use loan_model::CleaningOptions;
use loan_transform::{
    ConversionRecord, CorrelatedPair, ImputeRecord, OutlierRecord, SkewnessReport, TransformReport,
};

/// What every stage of a cleaning run did. Written as the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub options: CleaningOptions,
    pub input_shape: Shape,
    pub output_shape: Shape,
    pub converted: Vec<ConversionRecord>,
    pub dropped_sparse: Vec<String>,
    pub imputed: Vec<ImputeRecord>,
    /// Skewness before correction.
    pub skewness: SkewnessReport,
    pub transformed: TransformReport,
    pub outliers: Vec<OutlierRecord>,
    pub correlated: Vec<CorrelatedPair>,
    pub dropped_correlated: Vec<String>,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.input_shape.rows.saturating_sub(self.output_shape.rows)
    }
}

/// A cleaned table and its report.
#[derive(Debug)]
pub struct CleanedTable {
    pub data: DataFrame,
    pub report: CleaningReport,
}
