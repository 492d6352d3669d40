//! CSV reading and writing for loan tables.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Rows sampled by polars when inferring column dtypes.
pub const DEFAULT_INFER_SCHEMA_ROWS: usize = 1000;

/// Options for reading a loan extract.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Rows used for dtype inference; `None` scans the whole file.
    pub infer_schema_length: Option<usize>,
    /// Stop after this many data rows.
    pub n_rows: Option<usize>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: Some(DEFAULT_INFER_SCHEMA_ROWS),
            n_rows: None,
        }
    }
}

/// Reads a CSV file with a single header row into a DataFrame.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    read_csv_table_with_options(path, &IngestOptions::default())
}

/// Reads a CSV file into a DataFrame.
///
/// Empty fields become nulls; dtypes are inferred by polars.
pub fn read_csv_table_with_options(path: &Path, options: &IngestOptions) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .with_n_rows(options.n_rows)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.width() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );
    Ok(df)
}

/// Writes a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv_table(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| IngestError::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut data = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut data)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    debug!(path = %path.display(), rows = df.height(), "wrote table");
    Ok(())
}
