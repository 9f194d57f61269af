//! Presentation of the comparison table: console text, LaTeX and charts.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::comparison::ComparisonTable;
use crate::error::Result;
use crate::stats::calculate_statistics;
use crate::types::MetricVector;

pub mod charts;

pub use charts::{plot_comparison, plot_radar};

const TABLE_HEADERS: [&str; 8] = [
    "Method",
    "Model",
    "mAP@0.5",
    "mAP@0.5:0.95",
    "mAP@0.75",
    "Precision",
    "Recall",
    "F1-Score",
];

fn metric_cells(metrics: &MetricVector) -> [String; 6] {
    [
        metrics.map50,
        metrics.map50_95,
        metrics.map75,
        metrics.precision,
        metrics.recall,
        metrics.f1_score(),
    ]
    .map(|value| format!("{value:.4}"))
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:>width$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Render the table with columns right-aligned to their widest cell.
///
/// An empty table renders as a single notice line.
pub fn render_table(table: &ComparisonTable) -> String {
    if table.is_empty() {
        return "No comparison data available\n".to_string();
    }

    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            let mut cells = vec![row.method.clone(), row.model.clone()];
            cells.extend(metric_cells(&row.metrics));
            cells
        })
        .collect();

    let widths: Vec<usize> = TABLE_HEADERS
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|cells| cells[col].chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = "=".repeat(100);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}\nObject Detection Methods Comparison\n{rule}");
    let _ = writeln!(out, "{}", format_line(TABLE_HEADERS.iter().copied(), &widths));
    for cells in &rows {
        let _ = writeln!(out, "{}", format_line(cells.iter().map(String::as_str), &widths));
    }
    let _ = writeln!(out, "{rule}");
    out
}

/// Render the relative improvement block; empty for fewer than two rows.
///
/// The baseline row and rows equal to it are omitted.
pub fn render_improvements(table: &ComparisonTable) -> String {
    let improvements = table.relative_improvements();
    let Some(baseline) = table.baseline().filter(|_| !improvements.is_empty()) else {
        return String::new();
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Relative Improvement (baseline: {}, mAP@0.5:0.95 = {:.4}):",
        baseline.method, baseline.metrics.map50_95
    );
    for improvement in improvements
        .iter()
        .filter(|imp| !imp.is_baseline && imp.map50_95 != baseline.metrics.map50_95)
    {
        match improvement.percent {
            Some(percent) => {
                let _ = writeln!(out, "  {:<15}: {percent:+.2}%", improvement.method);
            }
            None => {
                let _ = writeln!(out, "  {:<15}: n/a (baseline is zero)", improvement.method);
            }
        }
    }
    out
}

/// Render mean, std, min and max for every metric across the table rows.
pub fn render_statistics(table: &ComparisonTable) -> String {
    let vectors: Vec<MetricVector> = table.rows().iter().map(|row| row.metrics).collect();
    let stats = calculate_statistics(&vectors);
    if stats.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Summary Statistics:");
    let _ = writeln!(out, "  {:<14} {:>8} {:>8} {:>8} {:>8}", "Metric", "Mean", "Std", "Min", "Max");
    for (name, s) in stats {
        let _ = writeln!(
            out,
            "  {name:<14} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
            s.mean, s.std, s.min, s.max
        );
    }
    out
}

/// Print table, improvements and statistics to stdout.
pub fn print_comparison(table: &ComparisonTable) {
    println!("\n{}", render_table(table));
    let improvements = render_improvements(table);
    if !improvements.is_empty() {
        println!("{improvements}");
    }
    if table.len() > 1 {
        println!("{}", render_statistics(table));
    }
}

/// Render a booktabs LaTeX table. Method names are emitted verbatim.
pub fn render_latex(table: &ComparisonTable) -> String {
    let mut out = String::new();
    out.push_str("\\begin{table}[htbp]\n\\centering\n");
    out.push_str("\\caption{Object detection results across enhancement methods}\n");
    out.push_str("\\label{tab:detection_comparison}\n");
    out.push_str("\\begin{tabular}{llllll}\n\\toprule\n");
    out.push_str("Method & mAP@0.5 & mAP@0.5:0.95 & Precision & Recall & F1-Score \\\\\n\\midrule\n");
    for row in table.rows() {
        let m = &row.metrics;
        let _ = writeln!(
            out,
            "{} & {:.4} & {:.4} & {:.4} & {:.4} & {:.4} \\\\",
            row.method,
            m.map50,
            m.map50_95,
            m.precision,
            m.recall,
            m.f1_score()
        );
    }
    out.push_str("\\bottomrule\n\\end{tabular}\n\\end{table}\n");
    out
}

/// Write [`render_latex`] output to `path`.
pub fn export_latex(table: &ComparisonTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_latex(table))?;
    log::info!("LaTeX table saved to {}", path.display());
    Ok(())
}
