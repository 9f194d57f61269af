//! Integration tests for the complete evaluate-persist-compare pipeline.

use std::fs;
use std::path::Path;

use enhance_eval::comparison::create_comparison_table;
use enhance_eval::driver::COMPARISON_FILE;
use enhance_eval::engine::{DetectionEngine, ValidationRequest};
use enhance_eval::error::{EvalError, Result};
use enhance_eval::persist::{load_metrics, save_metrics, METRICS_FILE, SUMMARY_FILE};
use enhance_eval::report::{render_improvements, render_table};
use enhance_eval::{DetectionMetrics, EvaluationDriver, HarnessConfig, Method, MethodResult, MetricVector};

/// Engine returning canned metrics per method; methods without an entry fail.
struct ScriptedEngine {
    responses: Vec<(Method, DetectionMetrics)>,
    seen_descriptors: Vec<String>,
}

impl DetectionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn validate(&mut self, request: &ValidationRequest<'_>) -> Result<DetectionMetrics> {
        self.seen_descriptors.push(fs::read_to_string(request.descriptor)?);
        self.responses
            .iter()
            .find(|(method, _)| *method == request.method)
            .map(|(_, metrics)| metrics.clone())
            .ok_or_else(|| EvalError::EngineFailed(format!("no weights for {}", request.method)))
    }
}

fn detection(map50_95: f64) -> DetectionMetrics {
    DetectionMetrics {
        map50: Some(map50_95 + 0.2),
        map: Some(map50_95),
        map75: Some(map50_95 + 0.05),
        mp: Some(0.7),
        mr: Some(0.5),
    }
}

fn config(root: &Path) -> HarnessConfig {
    HarnessConfig {
        model: "weights/yolov8x.pt".to_string(),
        data_root: root.join("data"),
        output_root: root.join("output"),
        config_dir: root.join("configs"),
        ..Default::default()
    }
}

fn write_result(root: &Path, dir: &str, method: Method, map50_95: f64) {
    let result = MethodResult {
        model: "yolov8x".to_string(),
        method,
        metrics: MetricVector::new(0.6, map50_95, 0.4, 0.7, 0.5),
    };
    save_metrics(&result, &root.join(dir).join(METRICS_FILE)).unwrap();
}

// ============================================================================
// COMPARISON FROM DISK
// ============================================================================

#[test]
fn test_three_methods_ranked_against_baseline() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "hsv", Method::Hsv, 0.40);
    write_result(dir.path(), "pwgcm", Method::Pwgcm, 0.50);
    write_result(dir.path(), "raw", Method::Raw, 0.30);

    let table = create_comparison_table(dir.path());
    let values: Vec<f64> = table.rows().iter().map(|r| r.metrics.map50_95).collect();
    assert_eq!(values, vec![0.50, 0.40, 0.30]);
    assert_eq!(table.baseline().unwrap().method, "raw");

    let improvements = table.relative_improvements();
    assert!((improvements[0].percent.unwrap() - 66.6667).abs() < 1e-3);
    assert!((improvements[1].percent.unwrap() - 33.3333).abs() < 1e-3);
    assert_eq!(improvements[2].percent, Some(0.0));

    let text = render_improvements(&table);
    assert!(text.contains("+66.67%"), "{text}");
    assert!(text.contains("+33.33%"), "{text}");
}

#[test]
fn test_directories_without_metrics_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "raw", Method::Raw, 0.30);
    fs::create_dir_all(dir.path().join("scratch")).unwrap();
    fs::create_dir_all(dir.path().join("broken")).unwrap();
    fs::write(dir.path().join("broken").join(METRICS_FILE), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "stray file").unwrap();

    let table = create_comparison_table(dir.path());
    assert_eq!(table.len(), 1);
    assert!(table.relative_improvements().is_empty());
}

#[test]
fn test_missing_results_dir_gives_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let table = create_comparison_table(&dir.path().join("nope"));
    assert!(table.is_empty());
    assert_eq!(render_table(&table), "No comparison data available\n");
}

#[test]
fn test_stored_f1_is_recomputed() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(
        raw.join(METRICS_FILE),
        r#"{"model": "yolov8x", "method": "raw", "metrics": {
            "mAP@0.5": 0.6, "mAP@0.5:0.95": 0.4, "mAP@0.75": 0.45,
            "precision": 0.8, "recall": 0.6, "f1_score": 0.99}}"#,
    )
    .unwrap();

    let result = load_metrics(&raw.join(METRICS_FILE)).unwrap();
    assert!((result.metrics.f1_score() - 0.685714).abs() < 1e-5);

    let table = create_comparison_table(dir.path());
    assert!((table.rows()[0].metrics.f1_score() - 0.685714).abs() < 1e-5);
}

// ============================================================================
// DRIVER WITH A SCRIPTED ENGINE
// ============================================================================

#[test]
fn test_batch_survives_failing_method() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine {
        responses: vec![(Method::Raw, detection(0.30)), (Method::Hsv, detection(0.40))],
        seen_descriptors: Vec::new(),
    };
    let mut driver = EvaluationDriver::new(engine, config(dir.path()));

    let outcome = driver.evaluate_all().unwrap();

    assert_eq!(outcome.failed(), vec![Method::Pwgcm]);
    assert_eq!(outcome.table.len(), 2);
    assert_eq!(outcome.table.rows()[0].method, "hsv");
    assert_eq!(outcome.table.baseline().unwrap().method, "raw");

    let output = dir.path().join("output");
    assert!(output.join("raw").join(SUMMARY_FILE).exists());
    assert!(!output.join("pwgcm").join(METRICS_FILE).exists());

    // Every method still gets a descriptor, including the failing one.
    assert_eq!(driver.engine().seen_descriptors.len(), 3);
    assert!(driver.engine().seen_descriptors[0].contains("traffic sign"));
}

#[test]
fn test_batch_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine {
        responses: Method::ALL.iter().map(|&m| (m, detection(0.25))).collect(),
        seen_descriptors: Vec::new(),
    };
    let mut driver = EvaluationDriver::new(engine, config(dir.path()));

    let outcome = driver.evaluate_all().unwrap();
    let csv_path = outcome.csv.unwrap();
    assert_eq!(csv_path, dir.path().join("output").join(COMPARISON_FILE));

    let csv = fs::read_to_string(csv_path).unwrap();
    let mut lines = csv.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("Method,Model,mAP@0.5,mAP@0.5:0.95"), "{header}");
    assert!(header.ends_with("F1-Score"), "{header}");
    assert_eq!(lines.count(), 3);
}

#[test]
fn test_incomplete_engine_output_persists_zeros() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine {
        responses: vec![(Method::Raw, DetectionMetrics { map50: Some(0.5), ..Default::default() })],
        seen_descriptors: Vec::new(),
    };
    let mut cfg = config(dir.path());
    cfg.methods = vec![Method::Raw];
    let mut driver = EvaluationDriver::new(engine, cfg);

    let metrics = driver.evaluate(Method::Raw).unwrap();
    assert_eq!(metrics, MetricVector::zero());

    let stored = load_metrics(&dir.path().join("output/raw").join(METRICS_FILE)).unwrap();
    assert_eq!(stored.metrics, MetricVector::zero());
    assert_eq!(stored.model, "yolov8x");
}
