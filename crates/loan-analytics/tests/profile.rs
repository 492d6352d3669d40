//! Profiling of a small loan table.

use polars::prelude::{Column, DataFrame};

use loan_analytics::{TableProfile, describe_columns, distinct_counts, shape, summary_statistics};

fn table() -> DataFrame {
    DataFrame::new(vec![
        Column::new("loan_amount".into(), [Some(1000.0), Some(2000.0), None, Some(3000.0), Some(4000.0)]),
        Column::new("grade".into(), [Some("A"), Some("B"), Some("A"), None, Some("C")]),
        Column::new("term".into(), [36i64, 60, 36, 36, 60]),
    ])
    .expect("df")
}

#[test]
fn shape_and_columns() {
    let df = table();
    assert_eq!(shape(&df).rows, 5);
    assert_eq!(shape(&df).columns, 3);
    let names: Vec<String> = describe_columns(&df).into_iter().map(|c| c.column).collect();
    assert_eq!(names, vec!["loan_amount", "grade", "term"]);
}

#[test]
fn statistics_skip_nulls() {
    let stats = summary_statistics(&table()).expect("stats");
    assert_eq!(stats.len(), 2);
    let amount = &stats[0];
    assert_eq!(amount.column, "loan_amount");
    assert_eq!(amount.count, 4);
    assert_eq!(amount.mean, Some(2500.0));
    assert_eq!(amount.min, Some(1000.0));
    assert_eq!(amount.q25, Some(1750.0));
    assert_eq!(amount.median, Some(2500.0));
    assert_eq!(amount.q75, Some(3250.0));
    assert_eq!(amount.max, Some(4000.0));
    let std = amount.std.expect("std");
    assert!((std - 1290.9944487358057).abs() < 1e-9);
}

#[test]
fn distinct_counts_ignore_nulls() {
    let counts = distinct_counts(&table()).expect("distinct");
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].column, "grade");
    assert_eq!(counts[0].distinct, 3);
}

#[test]
fn profile_collects_every_section() {
    let profile = TableProfile::from_frame(&table()).expect("profile");
    assert_eq!(profile.nulls.len(), 3);
    assert_eq!(profile.nulls[0].null_count, 1);
    assert_eq!(profile.statistics.len(), 2);
    assert!(profile.skewness.get("term").is_some());
}
