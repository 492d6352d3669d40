//! Profiling and loan-book analytics over a loaded loan table.
//!
//! - **profile**: dtypes, summary statistics, distinct counts, nulls, shape
//!   and skewness of a table
//! - **loan_book**: recoveries, six-month repayment projection, charge-offs
//!   and projected loss by issue year

pub mod error;
pub mod loan_book;
pub mod profile;

pub use error::{AnalyticsError, Result};
pub use loan_book::{
    ChargedOffSummary, LoanBookReport, MonthlyProjection, RecoverySummary, YearlyLoss,
    charged_off_summary, projected_loss_by_year, recovery_summary,
    six_month_projection,
};
pub use profile::{
    ColumnStatistics, ColumnType, DistinctCount, Shape, TableProfile, describe_columns,
    distinct_counts, shape, summary_statistics,
};
