//! Column type conversions: dates and categorical labels.
//!
//! Named columns that are absent from the table are skipped, so one option
//! set can be applied to extracts that carry different subsets of columns.

use chrono::NaiveDate;
use polars::prelude::{Categories, DataFrame, DataType, IntoColumn, NamedFrom, Series};
use serde::Serialize;
use tracing::{debug, info, info_span};

use loan_ingest::string_values;

use crate::error::Result;

/// Target type of a converted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertedType {
    Date,
    Categorical,
}

impl ConvertedType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Categorical => "categorical",
        }
    }
}

/// One converted column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRecord {
    pub column: String,
    pub target: ConvertedType,
    /// Non-null values after conversion.
    pub converted: usize,
    /// Values that could not be parsed and became null.
    pub coerced: usize,
}

/// Parse a date written as `01/02/2021`, `2021-02-01` or `Feb-2021`.
///
/// Month-only dates resolve to the first of the month.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("01-{value}"), "%d-%b-%Y"))
        .ok()
}

/// Convert the named columns to `Date`.
///
/// Values that do not parse become null and are counted as coerced.
pub fn convert_to_date(
    df: &DataFrame,
    columns: &[String],
) -> Result<(DataFrame, Vec<ConversionRecord>)> {
    let span = info_span!("convert_dates", columns = columns.len());
    let _guard = span.enter();

    // 1970-01-01
    let epoch = NaiveDate::default();
    let mut out = df.clone();
    let mut records = Vec::new();
    for name in columns {
        let Ok(column) = df.column(name) else {
            debug!(column = %name, "date column not present, skipped");
            continue;
        };

        let mut coerced = 0;
        let days: Vec<Option<i32>> = string_values(column)?
            .iter()
            .map(|value| {
                let raw = value.as_deref()?;
                let parsed = parse_date(raw);
                if parsed.is_none() && !raw.trim().is_empty() {
                    coerced += 1;
                }
                parsed.and_then(|date| i32::try_from((date - epoch).num_days()).ok())
            })
            .collect();
        let converted = days.iter().flatten().count();

        let dates = Series::new(name.as_str().into(), days).cast(&DataType::Date)?;
        out.with_column(dates.into_column())?;
        if coerced > 0 {
            debug!(column = %name, coerced, "unparseable dates set to null");
        }
        records.push(ConversionRecord {
            column: name.clone(),
            target: ConvertedType::Date,
            converted,
            coerced,
        });
    }

    info!(columns = records.len(), "date conversion complete");
    Ok((out, records))
}

/// Convert the named columns to `Categorical`, keeping nulls.
pub fn convert_to_categorical(
    df: &DataFrame,
    columns: &[String],
) -> Result<(DataFrame, Vec<ConversionRecord>)> {
    let span = info_span!("convert_categorical", columns = columns.len());
    let _guard = span.enter();

    let categorical = DataType::from_categories(Categories::global());
    let mut out = df.clone();
    let mut records = Vec::new();
    for name in columns {
        let Ok(column) = df.column(name) else {
            debug!(column = %name, "categorical column not present, skipped");
            continue;
        };

        let labels = column.cast(&DataType::String)?.cast(&categorical)?;
        let converted = labels.len() - labels.null_count();
        out.with_column(labels)?;
        records.push(ConversionRecord {
            column: name.clone(),
            target: ConvertedType::Categorical,
            converted,
            coerced: 0,
        });
    }

    info!(columns = records.len(), "categorical conversion complete");
    Ok((out, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn parses_every_date_format() {
        let expected = NaiveDate::from_ymd_opt(2021, 2, 1);
        assert_eq!(parse_date("01/02/2021"), expected);
        assert_eq!(parse_date(" Feb-2021 "), expected);
        assert_eq!(parse_date("2021-02-01"), expected);
        assert_eq!(parse_date("sometime"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn unparseable_dates_become_null() {
        let df = DataFrame::new(vec![
            Column::new(
                "issue_date".into(),
                [Some("01/02/2021"), Some("Mar-2021"), Some("soon"), None],
            ),
            Column::new("loan_amount".into(), [1.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap();

        let (out, records) = convert_to_date(&df, &names(&["issue_date"])).unwrap();

        let column = out.column("issue_date").unwrap();
        assert_eq!(column.dtype(), &DataType::Date);
        assert_eq!(column.null_count(), 2);
        assert_eq!(
            records,
            vec![ConversionRecord {
                column: "issue_date".to_string(),
                target: ConvertedType::Date,
                converted: 2,
                coerced: 1,
            }]
        );
        let days: Vec<Option<i32>> = column
            .cast(&DataType::Int32)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(days, vec![Some(18659), Some(18687), None, None]);
    }

    #[test]
    fn missing_columns_are_skipped() {
        let df = DataFrame::new(vec![Column::new("grade".into(), ["A", "B"])]).unwrap();

        let (out, dates) = convert_to_date(&df, &names(&["last_payment_date"])).unwrap();
        let (out, labels) = convert_to_categorical(&out, &names(&["term"])).unwrap();

        assert!(dates.is_empty());
        assert!(labels.is_empty());
        assert_eq!(out, df);
    }

    #[test]
    fn labels_become_categorical() {
        let df = DataFrame::new(vec![
            Column::new("grade".into(), [Some("A"), Some("B"), None, Some("A")]),
            Column::new("term".into(), [36i64, 60, 36, 36]),
        ])
        .unwrap();

        let (out, records) = convert_to_categorical(&df, &names(&["grade", "term"])).unwrap();

        let grade = out.column("grade").unwrap();
        assert!(matches!(grade.dtype(), DataType::Categorical(_, _)));
        assert_eq!(grade.null_count(), 1);
        assert!(matches!(out.column("term").unwrap().dtype(), DataType::Categorical(_, _)));
        let converted: Vec<usize> = records.iter().map(|r| r.converted).collect();
        assert_eq!(converted, vec![3, 4]);

        let back = string_values(grade).unwrap();
        assert_eq!(
            back,
            vec![Some("A".to_string()), Some("B".to_string()), None, Some("A".to_string())]
        );
    }
}
