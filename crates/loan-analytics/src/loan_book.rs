//! Loan-book analytics: recoveries, repayment projection and charge-offs.
//!
//! Sums skip null values. Percentages with a zero denominator are reported
//! as 0.

use std::collections::BTreeMap;

use chrono::Datelike;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

use loan_ingest::{is_numeric_dtype, numeric_values, string_values};
use loan_transform::parse_date;

use crate::error::{AnalyticsError, Result};

pub const RECOVERIES: &str = "recoveries";
pub const FUNDED_AMOUNT: &str = "funded_amount";
pub const FUNDED_AMOUNT_INV: &str = "funded_amount_inv";
pub const LOAN_STATUS: &str = "loan_status";
pub const OUT_PRNCP: &str = "out_prncp";
pub const INSTALMENT: &str = "instalment";
pub const INT_RATE: &str = "int_rate";
pub const TOTAL_PAYMENT: &str = "total_payment";
pub const TOTAL_REC_INT: &str = "total_rec_int";
pub const TOTAL_REC_LATE_FEE: &str = "total_rec_late_fee";
pub const ISSUE_DATE: &str = "issue_date";

pub const STATUS_CURRENT: &str = "Current";
pub const STATUS_CHARGED_OFF: &str = "Charged Off";

/// Months covered by [`six_month_projection`].
pub const PROJECTION_MONTHS: usize = 6;

/// Amount recovered against funding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoverySummary {
    pub recovered: f64,
    pub investor_funding: f64,
    pub total_funding: f64,
    pub percent_of_investor_funding: f64,
    pub percent_of_total_funding: f64,
}

/// Projected repayment of current loans for one future month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyProjection {
    /// 1-based month offset.
    pub month: usize,
    pub amount: f64,
    /// Share of the outstanding principal of current loans, in percent.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargedOffSummary {
    pub loans: usize,
    pub charged_off: usize,
    pub percentage: f64,
    /// Amount paid on charged-off loans before charge-off.
    pub total_payment: f64,
}

/// Revenue lost on charged-off loans issued in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyLoss {
    pub year: i32,
    pub loss: f64,
}

/// Everything the loans command reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanBookReport {
    pub recovery: RecoverySummary,
    pub projection: Vec<MonthlyProjection>,
    pub charged_off: ChargedOffSummary,
    pub projected_loss: Vec<YearlyLoss>,
}

impl LoanBookReport {
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            recovery: recovery_summary(df)?,
            projection: six_month_projection(df)?,
            charged_off: charged_off_summary(df)?,
            projected_loss: projected_loss_by_year(df)?,
        })
    }
}

pub fn recovery_summary(df: &DataFrame) -> Result<RecoverySummary> {
    let recovered = sum(&numeric_column(df, RECOVERIES)?);
    let investor_funding = sum(&numeric_column(df, FUNDED_AMOUNT_INV)?);
    let total_funding = sum(&numeric_column(df, FUNDED_AMOUNT)?);
    Ok(RecoverySummary {
        recovered,
        investor_funding,
        total_funding,
        percent_of_investor_funding: percentage(recovered, investor_funding),
        percent_of_total_funding: percentage(recovered, total_funding),
    })
}

/// Month-by-month repayment expected from `Current` loans.
///
/// Each loan repays `min(instalment, remaining * int_rate / 12)` per month,
/// where `remaining` is its outstanding principal less what it has repaid
/// so far in the projection. `int_rate` is used as stored. Loans with a
/// null principal, instalment or rate are left out.
pub fn six_month_projection(df: &DataFrame) -> Result<Vec<MonthlyProjection>> {
    let status = text_column(df, LOAN_STATUS)?;
    let out_prncp = numeric_column(df, OUT_PRNCP)?;
    let instalment = numeric_column(df, INSTALMENT)?;
    let int_rate = numeric_column(df, INT_RATE)?;

    let mut monthly = [0.0f64; PROJECTION_MONTHS];
    let mut outstanding = 0.0;
    for row in 0..df.height() {
        if status[row].as_deref() != Some(STATUS_CURRENT) {
            continue;
        }
        if let Some(principal) = out_prncp[row] {
            outstanding += principal;
        }
        let (Some(principal), Some(payment), Some(rate)) =
            (out_prncp[row], instalment[row], int_rate[row])
        else {
            debug!(row, "current loan without repayment terms skipped");
            continue;
        };
        let mut repaid = 0.0;
        for amount in &mut monthly {
            let remaining = (principal - repaid).max(0.0);
            let repayment = payment.min(remaining * rate / 12.0);
            *amount += repayment;
            repaid += repayment;
        }
    }

    Ok(monthly
        .iter()
        .enumerate()
        .map(|(idx, &amount)| {
            let amount = amount.min(outstanding);
            MonthlyProjection {
                month: idx + 1,
                amount,
                percentage: percentage(amount, outstanding),
            }
        })
        .collect())
}

pub fn charged_off_summary(df: &DataFrame) -> Result<ChargedOffSummary> {
    let status = text_column(df, LOAN_STATUS)?;
    let total_payment = numeric_column(df, TOTAL_PAYMENT)?;

    let mut charged_off = 0usize;
    let mut paid = 0.0;
    for (row, value) in status.iter().enumerate() {
        if value.as_deref() == Some(STATUS_CHARGED_OFF) {
            charged_off += 1;
            paid += total_payment[row].unwrap_or(0.0);
        }
    }
    let loans = df.height();
    Ok(ChargedOffSummary {
        loans,
        charged_off,
        percentage: percentage(charged_off as f64, loans as f64),
        total_payment: paid,
    })
}

/// Loss on charged-off loans (outstanding principal plus interest and late
/// fees received) grouped by issue year, oldest first.
pub fn projected_loss_by_year(df: &DataFrame) -> Result<Vec<YearlyLoss>> {
    let status = text_column(df, LOAN_STATUS)?;
    let issue_date = text_column(df, ISSUE_DATE)?;
    let out_prncp = numeric_column(df, OUT_PRNCP)?;
    let interest = numeric_column(df, TOTAL_REC_INT)?;
    let late_fee = numeric_column(df, TOTAL_REC_LATE_FEE)?;

    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for row in 0..df.height() {
        if status[row].as_deref() != Some(STATUS_CHARGED_OFF) {
            continue;
        }
        let Some(raw) = issue_date[row].as_deref() else {
            debug!(row, "charged-off loan without issue date skipped");
            continue;
        };
        let date = parse_date(raw).ok_or_else(|| AnalyticsError::InvalidDate {
            column: ISSUE_DATE.to_string(),
            row,
            value: raw.to_string(),
        })?;
        let loss = out_prncp[row].unwrap_or(0.0)
            + interest[row].unwrap_or(0.0)
            + late_fee[row].unwrap_or(0.0);
        *by_year.entry(date.year()).or_default() += loss;
    }

    Ok(by_year
        .into_iter()
        .map(|(year, loss)| YearlyLoss { year, loss })
        .collect())
}

fn sum(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name).map_err(|_| AnalyticsError::MissingColumn {
        column: name.to_string(),
    })?;
    if !is_numeric_dtype(column.dtype()) {
        return Err(AnalyticsError::NonNumericColumn {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    Ok(numeric_values(column)?)
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name).map_err(|_| AnalyticsError::MissingColumn {
        column: name.to_string(),
    })?;
    Ok(string_values(column)?)
}
