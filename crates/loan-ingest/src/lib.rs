//! Loan data ingestion.
//!
//! - **csv_table**: read a loan extract into a polars `DataFrame` and write
//!   cleaned tables back out
//! - **polars_utils**: dtype checks and value extraction shared by the
//!   cleaning and analytics crates

pub mod csv_table;
pub mod error;
pub mod polars_utils;

pub use csv_table::{IngestOptions, read_csv_table, read_csv_table_with_options, write_csv_table};
pub use error::{IngestError, Result};
pub use polars_utils::{
    any_to_string, format_numeric, is_numeric_dtype, is_string_dtype,
    numeric_values, parse_f64, string_values,
};
