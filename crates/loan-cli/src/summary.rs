use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use loan_analytics::{LoanBookReport, TableProfile};
use loan_transform::FillValue;

use crate::commands::CleanResult;

pub fn print_clean_summary(result: &CleanResult) {
    let report = &result.report;
    println!("Input: {}", result.input.display());
    println!("Output: {}", result.output.display());
    if let Some(path) = &result.report_path {
        println!("Report: {}", path.display());
    }
    println!(
        "Rows: {} -> {}   Columns: {} -> {}",
        report.input_shape.rows,
        report.output_shape.rows,
        report.input_shape.columns,
        report.output_shape.columns
    );
    for record in &report.converted {
        println!(
            "Converted {} to {}: {} values, {} unparseable",
            record.column,
            record.target.as_str(),
            record.converted, record.coerced
        );
    }
    if !report.dropped_sparse.is_empty() {
        println!("Dropped sparse columns: {}", report.dropped_sparse.join(", "));
    }
    if !report.dropped_correlated.is_empty() {
        println!(
            "Dropped correlated columns: {}",
            report.dropped_correlated.join(", ")
        );
    }

    if !report.imputed.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Column"),
            header_cell("Strategy"),
            header_cell("Fill"),
            header_cell("Filled"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 3, CellAlignment::Right);
        for record in &report.imputed {
            let fill = match &record.fill {
                FillValue::Number(value) => format!("{value:.4}"),
                FillValue::Text(value) => value.clone(),
            };
            table.add_row(vec![
                Cell::new(&record.column),
                Cell::new(record.strategy.as_str()),
                Cell::new(fill),
                count_cell(record.filled),
            ]);
        }
        println!();
        println!("Imputed:");
        println!("{table}");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Transformation"),
        header_cell("Skew before"),
        header_cell("Skew after"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in report.skewness.entries() {
        match report.transformed.get(&entry.column) {
            Some(record) => table.add_row(vec![
                Cell::new(&record.column),
                Cell::new(record.transformation.to_string())
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
                Cell::new(format!("{:.4}", record.skew_before)),
                Cell::new(format!("{:.4}", record.skew_after)),
            ]),
            None => table.add_row(vec![
                Cell::new(&entry.column),
                dim_cell("-"),
                Cell::new(format!("{:.4}", entry.skewness)),
                dim_cell("-"),
            ]),
        };
    }
    println!();
    println!("Skewness (threshold {}):", report.options.skew_threshold);
    println!("{table}");

    if !report.outliers.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Column"),
            header_cell("Lower"),
            header_cell("Upper"),
            header_cell("Removed"),
        ]);
        apply_table_style(&mut table);
        for idx in 1..=3 {
            align_column(&mut table, idx, CellAlignment::Right);
        }
        for record in &report.outliers {
            table.add_row(vec![
                Cell::new(&record.column),
                Cell::new(format!("{:.4}", record.lower)),
                Cell::new(format!("{:.4}", record.upper)),
                count_cell(record.removed),
            ]);
        }
        println!();
        println!("Outliers ({} rows removed):", report.rows_removed());
        println!("{table}");
    }
}

pub fn print_profile(profile: &TableProfile) {
    println!(
        "Shape: {} rows x {} columns",
        profile.shape.rows, profile.shape.columns
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Dtype"),
        header_cell("Nulls"),
        header_cell("Null %"),
        header_cell("Distinct"),
        header_cell("Skew"),
    ]);
    apply_table_style(&mut table);
    for idx in 2..=5 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for (column, nulls) in profile.columns.iter().zip(&profile.nulls) {
        let distinct = profile
            .distinct
            .iter()
            .find(|entry| entry.column == column.column)
            .map(|entry| entry.distinct);
        table.add_row(vec![
            Cell::new(&column.column),
            dim_cell(&column.dtype),
            count_cell(nulls.null_count),
            Cell::new(format!("{:.2}", nulls.null_percentage)),
            optional_cell(distinct.map(|count| count.to_string())),
            optional_cell(profile.skewness.get(&column.column).map(|s| format!("{s:.4}"))),
        ]);
    }
    println!("{table}");

    if profile.statistics.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Mean"),
        header_cell("Std"),
        header_cell("Min"),
        header_cell("25%"),
        header_cell("50%"),
        header_cell("75%"),
        header_cell("Max"),
    ]);
    apply_table_style(&mut table);
    for idx in 1..=8 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for stats in &profile.statistics {
        table.add_row(vec![
            Cell::new(&stats.column),
            Cell::new(stats.count),
            number_cell(stats.mean),
            number_cell(stats.std),
            number_cell(stats.min),
            number_cell(stats.q25),
            number_cell(stats.median),
            number_cell(stats.q75),
            number_cell(stats.max),
        ]);
    }
    println!();
    println!("Statistics:");
    println!("{table}");
}

pub fn print_loan_book(report: &LoanBookReport) {
    let recovery = &report.recovery;
    println!(
        "Recoveries: {:.2} ({:.2}% of investor funding, {:.2}% of total funding)",
        recovery.recovered, recovery.percent_of_investor_funding, recovery.percent_of_total_funding
    );
    let charged_off = &report.charged_off;
    println!(
        "Charged off: {} of {} loans ({:.2}%), {:.2} paid before charge-off",
        charged_off.charged_off, charged_off.loans, charged_off.percentage, charged_off.total_payment
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Month"),
        header_cell("Projected"),
        header_cell("% outstanding"),
    ]);
    apply_table_style(&mut table);
    for idx in 0..=2 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for month in &report.projection {
        table.add_row(vec![
            Cell::new(month.month),
            Cell::new(format!("{:.2}", month.amount)),
            Cell::new(format!("{:.2}", month.percentage)),
        ]);
    }
    println!();
    println!("Repayment projection (current loans):");
    println!("{table}");

    if report.projected_loss.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Issue year"), header_cell("Projected loss")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for year in &report.projected_loss {
        table.add_row(vec![
            Cell::new(year.year),
            Cell::new(format!("{:.2}", year.loss)).fg(Color::Red),
        ]);
    }
    println!();
    println!("Projected loss (charged-off loans):");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn number_cell(value: Option<f64>) -> Cell {
    optional_cell(value.map(|v| format!("{v:.4}")))
}

fn optional_cell(value: Option<String>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
