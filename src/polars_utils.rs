//! Utilities for working with Polars DataFrames
//!
//! The comparison table is exported through a DataFrame so the CSV layout
//! matches the console table column for column.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;

use crate::comparison::ComparisonTable;
use crate::error::{EvalError, Result};
use crate::types::MetricVector;

/// Column order of the exported comparison table
pub const COMPARISON_COLUMNS: [&str; 8] = [
    "Method",
    "Model",
    "mAP@0.5",
    "mAP@0.5:0.95",
    "mAP@0.75",
    "Precision",
    "Recall",
    "F1-Score",
];

/// Validate that a DataFrame contains all required columns
///
/// # Returns
///
/// `Ok(())` if all columns are present, [`EvalError::MissingColumn`] naming
/// the first absent one otherwise
pub fn validate_columns(df: &DataFrame, required_columns: &[&str]) -> Result<()> {
    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for col in required_columns {
        if !column_names.iter().any(|c| c == col) {
            return Err(EvalError::MissingColumn(col.to_string()));
        }
    }

    Ok(())
}

/// Convert a comparison table into a DataFrame, one row per method, in
/// table order
pub fn comparison_to_dataframe(table: &ComparisonTable) -> Result<DataFrame> {
    let rows = table.rows();
    let column = |f: fn(&MetricVector) -> f64| -> Vec<f64> {
        rows.iter().map(|row| f(&row.metrics)).collect()
    };

    let df = df! {
        COMPARISON_COLUMNS[0] => rows.iter().map(|r| r.method.clone()).collect::<Vec<_>>(),
        COMPARISON_COLUMNS[1] => rows.iter().map(|r| r.model.clone()).collect::<Vec<_>>(),
        COMPARISON_COLUMNS[2] => column(|m| m.map50),
        COMPARISON_COLUMNS[3] => column(|m| m.map50_95),
        COMPARISON_COLUMNS[4] => column(|m| m.map75),
        COMPARISON_COLUMNS[5] => column(|m| m.precision),
        COMPARISON_COLUMNS[6] => column(|m| m.recall),
        COMPARISON_COLUMNS[7] => column(|m| m.f1_score()),
    }?;

    validate_columns(&df, &COMPARISON_COLUMNS)?;
    Ok(df)
}

/// Write the comparison table as CSV with a header row
pub fn write_comparison_csv(table: &ComparisonTable, path: &Path) -> Result<()> {
    let mut df = comparison_to_dataframe(table)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    Ok(())
}
