//! Comparison table rebuilt from the persisted per-method results.
//!
//! The table is a view over `{results_dir}/*/metrics.json`: it is never
//! stored and is rebuilt from scratch on every call.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::persist::METRICS_FILE;
use crate::types::MetricVector;

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub method: String,
    pub model: String,
    pub metrics: MetricVector,
}

/// Lenient on-disk form: every field may be absent.
#[derive(Deserialize)]
struct StoredResult {
    method: Option<String>,
    model: Option<String>,
    #[serde(default)]
    metrics: MetricVector,
}

/// Relative change of one row's mAP@0.5:0.95 against the baseline row.
#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    pub method: String,
    pub map50_95: f64,
    /// Percentage delta; `None` when the baseline is zero and the row is not.
    pub percent: Option<f64>,
    pub is_baseline: bool,
}

/// Rows sorted by mAP@0.5:0.95, highest first. Ties keep discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Build a table; the rows are stably sorted on construction.
    pub fn new(mut rows: Vec<ComparisonRow>) -> Self {
        rows.sort_by(|a, b| b.metrics.map50_95.total_cmp(&a.metrics.map50_95));
        Self { rows }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last row (lowest mAP@0.5:0.95) is the reference for relative
    /// improvements.
    pub fn baseline(&self) -> Option<&ComparisonRow> {
        self.rows.last()
    }

    /// Percentage change of each row's mAP@0.5:0.95 against [`baseline`].
    ///
    /// Empty unless the table has at least two rows. Rows equal to the
    /// baseline report 0%.
    ///
    /// [`baseline`]: ComparisonTable::baseline
    ///
    /// # Example
    ///
    /// ```
    /// use enhance_eval::comparison::{ComparisonRow, ComparisonTable};
    /// use enhance_eval::types::MetricVector;
    ///
    /// let row = |method: &str, map: f64| ComparisonRow {
    ///     method: method.to_string(),
    ///     model: "yolov8x".to_string(),
    ///     metrics: MetricVector::new(0.0, map, 0.0, 0.0, 0.0),
    /// };
    /// let table = ComparisonTable::new(vec![row("raw", 0.2), row("hsv", 0.4)]);
    /// let improvements = table.relative_improvements();
    /// assert_eq!(improvements[0].method, "hsv");
    /// assert!((improvements[0].percent.unwrap() - 100.0).abs() < 1e-9);
    /// assert!(improvements[1].is_baseline);
    /// ```
    pub fn relative_improvements(&self) -> Vec<Improvement> {
        if self.rows.len() < 2 {
            return Vec::new();
        }
        let last = self.rows.len() - 1;
        let baseline = self.rows[last].metrics.map50_95;

        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let value = row.metrics.map50_95;
                let percent = if value == baseline {
                    Some(0.0)
                } else if baseline == 0.0 {
                    None
                } else {
                    Some((value - baseline) / baseline * 100.0)
                };
                Improvement {
                    method: row.method.clone(),
                    map50_95: value,
                    percent,
                    is_baseline: idx == last,
                }
            })
            .collect()
    }
}

fn read_row(dir: &Path, metrics_file: &Path) -> Result<ComparisonRow> {
    let reader = BufReader::new(File::open(metrics_file)?);
    let stored: StoredResult = serde_json::from_reader(reader)?;
    let dir_name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ComparisonRow {
        method: stored.method.unwrap_or(dir_name),
        model: stored.model.unwrap_or_else(|| "Unknown".to_string()),
        metrics: stored.metrics,
    })
}

/// Scan the immediate subdirectories of `results_dir` for `metrics.json`.
///
/// Subdirectories are visited in file-name order. Directories without a
/// metrics file are skipped silently; unreadable or malformed files are
/// skipped with a warning. A missing `results_dir` yields an empty table.
pub fn create_comparison_table(results_dir: &Path) -> ComparisonTable {
    let mut dirs: Vec<PathBuf> = match fs::read_dir(results_dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect(),
        Err(err) => {
            log::debug!("cannot read results directory {}: {err}", results_dir.display());
            return ComparisonTable::default();
        }
    };
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let rows = dirs
        .iter()
        .filter_map(|dir| {
            let metrics_file = dir.join(METRICS_FILE);
            if !metrics_file.is_file() {
                return None;
            }
            match read_row(dir, &metrics_file) {
                Ok(row) => Some(row),
                Err(err) => {
                    log::warn!("skipping {}: {err}", metrics_file.display());
                    None
                }
            }
        })
        .collect();

    ComparisonTable::new(rows)
}
