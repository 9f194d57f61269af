//! # enhance-eval
//!
//! An evaluation harness comparing object detection accuracy across image
//! enhancement methods (`raw`, `pwgcm`, `hsv`) on a BDD100K-style dataset.
//!
//! The pipeline has four stages:
//! - **Staging**: copy or link each method's images into `images/{method}`
//!   and verify that they pair with the labels in `labels/val`
//! - **Descriptors**: write a per-method dataset descriptor YAML for the
//!   detection engine
//! - **Evaluation**: run a [`DetectionEngine`] per method, extract a
//!   [`MetricVector`] and persist it as `metrics.json` plus a text summary
//! - **Comparison**: rebuild a ranked [`ComparisonTable`] from everything on
//!   disk and render it as a console table, CSV, SVG charts or LaTeX
//!
//! Two engines are provided. [`UltralyticsEngine`] drives the Ultralytics
//! Python package through a subprocess. [`OfflineEngine`] scores stored
//! YOLO-format prediction files with the built-in COCO-style evaluator.
//!
//! ## Quick Start
//!
//! ```rust
//! use enhance_eval::comparison::{ComparisonRow, ComparisonTable};
//! use enhance_eval::MetricVector;
//!
//! let row = |method: &str, map: f64| ComparisonRow {
//!     method: method.to_string(),
//!     model: "yolov8x".to_string(),
//!     metrics: MetricVector::new(0.6, map, 0.4, 0.7, 0.6),
//! };
//! let table = ComparisonTable::new(vec![row("raw", 0.30), row("pwgcm", 0.50), row("hsv", 0.40)]);
//!
//! let order: Vec<&str> = table.rows().iter().map(|r| r.method.as_str()).collect();
//! assert_eq!(order, ["pwgcm", "hsv", "raw"]);
//! assert_eq!(table.baseline().unwrap().method, "raw");
//! ```
//!
//! ## Persisted layout
//!
//! ```text
//! {output_root}/
//!   comparison.csv
//!   {method}/
//!     metrics.json          {"model": ..., "method": ..., "metrics": {...}}
//!     metrics_summary.txt
//! ```

pub mod comparison;
pub mod config;
pub mod descriptor;
pub mod driver;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod loader;
pub mod matching;
pub mod metrics;
pub mod nms;
pub mod persist;
pub mod polars_utils;
pub mod report;
pub mod staging;
pub mod stats;
pub mod threshold;
pub mod types;
pub mod verify;

// Re-export commonly used types and functions
pub use comparison::{create_comparison_table, ComparisonRow, ComparisonTable, Improvement};
pub use config::{HarnessConfig, ValidationParams};
pub use driver::EvaluationDriver;
pub use engine::{DetectionEngine, OfflineEngine, UltralyticsEngine, ValidationRequest};
pub use error::{EvalError, Result};
pub use extract::extract_metrics;
pub use metrics::calculate_f1_score;
pub use staging::{DataPreparer, StageMode, Stager};
pub use types::{DetectionMetrics, Method, MethodResult, MetricVector};
