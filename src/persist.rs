//! Persistence of per-method results: `metrics.json` and `metrics_summary.txt`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::types::{MethodResult, MetricVector};

/// File name of the machine-readable result inside a method directory.
pub const METRICS_FILE: &str = "metrics.json";

/// File name of the human-readable summary inside a method directory.
pub const SUMMARY_FILE: &str = "metrics_summary.txt";

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write `{model, method, metrics}` as pretty-printed JSON.
pub fn save_metrics(result: &MethodResult, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    log::info!("metrics saved to {}", path.display());
    Ok(())
}

/// Read a persisted result. F1 is recomputed from precision and recall.
pub fn load_metrics(path: &Path) -> Result<MethodResult> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Render the fixed-layout summary report.
pub fn render_summary(model: &str, method: &str, metrics: &MetricVector) -> String {
    let rule = "=".repeat(60);
    let thin = "-".repeat(60);
    format!(
        "{rule}\n\
         Object Detection Evaluation Summary\n\
         {rule}\n\n\
         Model: {model}\n\
         Method: {method}\n\
         {thin}\n\n\
         Primary Metrics:\n\
         \x20 mAP@0.5:0.95 (COCO):  {:.4}\n\
         \x20 mAP@0.5 (PASCAL VOC): {:.4}\n\
         \x20 mAP@0.75:             {:.4}\n\n\
         Secondary Metrics:\n\
         \x20 Precision:            {:.4}\n\
         \x20 Recall:               {:.4}\n\
         \x20 F1-Score:             {:.4}\n\n\
         {rule}\n",
        metrics.map50_95,
        metrics.map50,
        metrics.map75,
        metrics.precision,
        metrics.recall,
        metrics.f1_score(),
    )
}

/// Write the summary report for `result`.
pub fn save_metrics_summary(result: &MethodResult, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, render_summary(&result.model, result.method.as_str(), &result.metrics))?;
    log::info!("summary saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Method;

    fn sample() -> MethodResult {
        MethodResult {
            model: "yolov8x".to_string(),
            method: Method::Pwgcm,
            metrics: MetricVector::new(0.654, 0.432, 0.45, 0.723, 0.689),
        }
    }

    #[test]
    fn test_save_creates_parents_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/pwgcm").join(METRICS_FILE);

        save_metrics(&sample(), &path).unwrap();
        let loaded = load_metrics(&path).unwrap();
        assert_eq!(loaded, sample());

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["method"], "pwgcm");
        assert_eq!(json["metrics"]["mAP@0.5:0.95"], 0.432);
    }

    #[test]
    fn test_summary_layout() {
        let text = render_summary("yolov8x", "hsv", &sample().metrics);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(lines[1], "Object Detection Evaluation Summary");
        assert!(text.contains("Model: yolov8x\n"));
        assert!(text.contains("Method: hsv\n"));
        assert!(text.contains("  mAP@0.5:0.95 (COCO):  0.4320\n"));
        assert!(text.contains("  Recall:               0.6890\n"));
        assert!(text.contains("  F1-Score:             0.7056\n"));
    }

    #[test]
    fn test_save_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SUMMARY_FILE);
        save_metrics_summary(&sample(), &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("Method: pwgcm"));
    }
}
