//! SVG charts for the comparison table.

use std::f64::consts::PI;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::comparison::ComparisonTable;
use crate::error::{EvalError, Result};
use crate::types::MetricVector;

/// Metrics drawn on the radar chart, each normalised to its column maximum.
pub const RADAR_METRICS: [&str; 5] = ["mAP@0.5", "mAP@0.5:0.95", "Precision", "Recall", "F1-Score"];

const BLUE_BAR: RGBColor = RGBColor(52, 101, 164);
const ORANGE_BAR: RGBColor = RGBColor(245, 121, 0);
const GREEN_BAR: RGBColor = RGBColor(78, 154, 6);

fn chart_err<E: Display>(err: E) -> EvalError {
    EvalError::ChartError(err.to_string())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

struct BarSeries<'a> {
    label: &'a str,
    values: Vec<f64>,
    color: RGBColor,
}

/// Grouped bars, one group per method centred on integer x positions.
fn grouped_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    methods: &[String],
    series: &[BarSeries<'_>],
    value_labels: bool,
) -> Result<()> {
    let n = methods.len();
    let group_width = 0.8;
    let bar_width = group_width / series.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..1.1f64)
        .map_err(chart_err)?;

    let method_label = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < n {
            methods[idx as usize].to_uppercase()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&method_label)
        .y_desc("Score")
        .draw()
        .map_err(chart_err)?;

    let label_style = ("sans-serif", 13)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));

    for (j, s) in series.iter().enumerate() {
        let color = s.color;
        let offset = -group_width / 2.0 + j as f64 * bar_width;
        let bars = s.values.iter().enumerate().map(move |(i, &value)| {
            let left = i as f64 + offset;
            Rectangle::new([(left, 0.0), (left + bar_width * 0.9, value)], color.filled())
        });

        chart
            .draw_series(bars)
            .map_err(chart_err)?
            .label(s.label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        if value_labels {
            let texts = s.values.iter().enumerate().map(|(i, &value)| {
                let centre = i as f64 + offset + bar_width * 0.45;
                Text::new(format!("{value:.3}"), (centre, value), label_style.clone())
            });
            chart.draw_series(texts).map_err(chart_err)?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(chart_err)?;

    Ok(())
}

fn summary_lines(table: &ComparisonTable) -> Vec<String> {
    let mut lines = Vec::new();
    let (Some(best), Some(baseline)) = (table.rows().first(), table.baseline()) else {
        return lines;
    };

    lines.push(format!("Best method: {}", best.method.to_uppercase()));
    lines.push(format!("  mAP@0.5:0.95 = {:.4}", best.metrics.map50_95));
    lines.push(format!("  mAP@0.5      = {:.4}", best.metrics.map50));
    lines.push(format!("  F1-Score     = {:.4}", best.metrics.f1_score()));
    lines.push(String::new());
    lines.push(format!("Baseline: {}", baseline.method.to_uppercase()));

    for improvement in table.relative_improvements().iter().filter(|imp| !imp.is_baseline) {
        let delta = improvement
            .percent
            .map(|p| format!("{p:+.2}%"))
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!("  {:<8} {delta}", improvement.method.to_uppercase()));
    }
    lines
}

fn draw_summary<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, table: &ComparisonTable) -> Result<()> {
    let inner = area
        .titled("Summary", ("sans-serif", 22))
        .map_err(chart_err)?;
    let style = ("monospace", 16).into_font().color(&BLACK);

    for (i, line) in summary_lines(table).iter().enumerate() {
        inner
            .draw_text(line, &style, (30, 20 + 24 * i as i32))
            .map_err(chart_err)?;
    }
    Ok(())
}

/// Draw the 2×2 comparison panel: mAP variants, precision and recall, F1
/// with value labels, and a text summary.
///
/// # Errors
///
/// [`EvalError::EmptyDataset`] for an empty table, [`EvalError::ChartError`]
/// when drawing fails.
pub fn plot_comparison(table: &ComparisonTable, path: &Path) -> Result<()> {
    if table.is_empty() {
        return Err(EvalError::EmptyDataset("no rows to plot".to_string()));
    }
    ensure_parent(path)?;

    let rows = table.rows();
    let methods: Vec<String> = rows.iter().map(|row| row.method.clone()).collect();
    let column = |f: fn(&MetricVector) -> f64| -> Vec<f64> {
        rows.iter().map(|row| f(&row.metrics)).collect()
    };

    let root = SVGBackend::new(path, (1400, 1000)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let panels = root.split_evenly((2, 2));

    grouped_bars(
        &panels[0],
        "mAP Comparison",
        &methods,
        &[
            BarSeries { label: "mAP@0.5", values: column(|m| m.map50), color: BLUE_BAR },
            BarSeries { label: "mAP@0.5:0.95", values: column(|m| m.map50_95), color: ORANGE_BAR },
            BarSeries { label: "mAP@0.75", values: column(|m| m.map75), color: GREEN_BAR },
        ],
        false,
    )?;

    grouped_bars(
        &panels[1],
        "Precision vs Recall",
        &methods,
        &[
            BarSeries { label: "Precision", values: column(|m| m.precision), color: BLUE_BAR },
            BarSeries { label: "Recall", values: column(|m| m.recall), color: ORANGE_BAR },
        ],
        false,
    )?;

    grouped_bars(
        &panels[2],
        "F1-Score",
        &methods,
        &[BarSeries { label: "F1-Score", values: column(|m| m.f1_score()), color: GREEN_BAR }],
        true,
    )?;

    draw_summary(&panels[3], table)?;

    root.present().map_err(chart_err)?;
    log::info!("comparison chart saved to {}", path.display());
    Ok(())
}

/// Per-row values of [`RADAR_METRICS`], each divided by its column maximum.
/// A column whose maximum is zero stays at zero.
pub fn normalized_radar_values(table: &ComparisonTable) -> Vec<[f64; 5]> {
    let raw: Vec<[f64; 5]> = table
        .rows()
        .iter()
        .map(|row| {
            let m = &row.metrics;
            [m.map50, m.map50_95, m.precision, m.recall, m.f1_score()]
        })
        .collect();

    let mut maxima = [0.0f64; 5];
    for values in &raw {
        for (max, &value) in maxima.iter_mut().zip(values) {
            *max = max.max(value);
        }
    }

    raw.into_iter()
        .map(|values| {
            let mut normalized = [0.0; 5];
            for ((out, value), max) in normalized.iter_mut().zip(values).zip(maxima) {
                *out = if max > 0.0 { value / max } else { 0.0 };
            }
            normalized
        })
        .collect()
}

/// Draw the radar chart. Returns `false` without writing anything when the
/// table has fewer than two rows.
pub fn plot_radar(table: &ComparisonTable, path: &Path) -> Result<bool> {
    if table.len() < 2 {
        log::warn!("radar chart needs at least two methods; skipping");
        return Ok(false);
    }
    ensure_parent(path)?;

    let (width, height) = (900u32, 900u32);
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let root = root
        .titled("Normalized Metric Comparison", ("sans-serif", 26))
        .map_err(chart_err)?;

    let centre = (width as f64 / 2.0, height as f64 / 2.0 - 20.0);
    let radius = 300.0;
    let axes = RADAR_METRICS.len();
    let point = |axis: usize, r: f64| -> (i32, i32) {
        let angle = PI / 2.0 - 2.0 * PI * axis as f64 / axes as f64;
        (
            (centre.0 + radius * r * angle.cos()).round() as i32,
            (centre.1 - radius * r * angle.sin()).round() as i32,
        )
    };

    let grid = BLACK.mix(0.25).stroke_width(1);
    for ring in 1..=4 {
        let r = ring as f64 / 4.0;
        let mut outline: Vec<(i32, i32)> = (0..axes).map(|axis| point(axis, r)).collect();
        outline.push(point(0, r));
        root.draw(&PathElement::new(outline, grid)).map_err(chart_err)?;
    }

    let axis_style = ("sans-serif", 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (axis, name) in RADAR_METRICS.iter().enumerate() {
        root.draw(&PathElement::new(vec![point(axis, 0.0), point(axis, 1.0)], grid))
            .map_err(chart_err)?;
        root.draw_text(name, &axis_style, point(axis, 1.12)).map_err(chart_err)?;
    }

    let legend_style = ("sans-serif", 16).into_font().color(&BLACK);
    for (idx, (row, values)) in table.rows().iter().zip(normalized_radar_values(table)).enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let polygon: Vec<(i32, i32)> = values.iter().enumerate().map(|(axis, &v)| point(axis, v)).collect();

        root.draw(&Polygon::new(polygon.clone(), color.mix(0.15).filled()))
            .map_err(chart_err)?;
        let mut outline = polygon;
        if let Some(&first) = outline.first() {
            outline.push(first);
        }
        root.draw(&PathElement::new(outline, color.stroke_width(2)))
            .map_err(chart_err)?;

        let y = 40 + 24 * idx as i32;
        root.draw(&Rectangle::new([(20, y - 6), (34, y + 6)], color.filled()))
            .map_err(chart_err)?;
        root.draw_text(&row.method.to_uppercase(), &legend_style, (42, y - 8))
            .map_err(chart_err)?;
    }

    root.present().map_err(chart_err)?;
    log::info!("radar chart saved to {}", path.display());
    Ok(true)
}
