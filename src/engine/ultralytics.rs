//! Ultralytics YOLO validation through a Python subprocess.
//!
//! The engine runs a short inline script with `python -c`. The script loads
//! the weights, calls `model.val(...)` and prints one line prefixed with
//! [`METRICS_MARKER`] holding the box metrics as JSON. Everything else the
//! library prints is passed through to the log.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Deserialize;

use super::{DetectionEngine, ValidationRequest};
use crate::error::{EvalError, Result};
use crate::types::DetectionMetrics;

/// Prefix of the stdout line carrying the metrics JSON.
pub const METRICS_MARKER: &str = "@@metrics ";

const LOAD_SCRIPT: &str = r#"
import sys
import ultralytics
from ultralytics import YOLO

YOLO(sys.argv[1])
print(ultralytics.__version__)
"#;

const VALIDATE_SCRIPT: &str = r#"
import json, sys
from ultralytics import YOLO

model, data, batch, imgsz, conf, iou, device, project = sys.argv[1:9]
metrics = YOLO(model).val(
    data=data,
    split="val",
    batch=int(batch),
    imgsz=int(imgsz),
    conf=float(conf),
    iou=float(iou),
    device=device,
    plots=False,
    save_json=True,
    project=project,
    name="results",
    exist_ok=True,
)
box = getattr(metrics, "box", None)
out = {}
for key in ("map50", "map", "map75", "mp", "mr"):
    value = getattr(box, key, None)
    out[key] = None if value is None else float(value)
print("@@metrics " + json.dumps(out), flush=True)
"#;

/// Metrics line as printed by the validation script.
#[derive(Debug, Default, Deserialize)]
struct BoxMetrics {
    map50: Option<f64>,
    map: Option<f64>,
    map75: Option<f64>,
    mp: Option<f64>,
    mr: Option<f64>,
}

impl From<BoxMetrics> for DetectionMetrics {
    fn from(value: BoxMetrics) -> Self {
        DetectionMetrics {
            map50: value.map50,
            map: value.map,
            map75: value.map75,
            mp: value.mp,
            mr: value.mr,
        }
    }
}

/// Find the marker line in the script's stdout and decode it.
pub fn parse_metrics_output(stdout: &str) -> Result<DetectionMetrics> {
    let line = stdout
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix(METRICS_MARKER))
        .ok_or_else(|| EvalError::EngineFailed("validation produced no metrics line".to_string()))?;
    let metrics: BoxMetrics = serde_json::from_str(line)?;
    Ok(metrics.into())
}

/// Validation backend that shells out to the Ultralytics Python package.
#[derive(Debug, Clone)]
pub struct UltralyticsEngine {
    python: PathBuf,
    model: String,
    version: String,
}

impl UltralyticsEngine {
    /// Check that `python` can import `ultralytics` and load the weights at
    /// `model`.
    ///
    /// # Errors
    ///
    /// [`EvalError::EngineUnavailable`] if the interpreter cannot be started,
    /// the import fails or the model cannot be loaded.
    pub fn load<P: Into<PathBuf>>(python: P, model: &str) -> Result<Self> {
        let python = python.into();
        let output = Command::new(&python)
            .args(["-c", LOAD_SCRIPT, model])
            .output()
            .map_err(|e| EvalError::EngineUnavailable(format!("cannot start {}: {e}", python.display())))?;

        if !output.status.success() {
            return Err(EvalError::EngineUnavailable(format!(
                "cannot load model {model}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        log::info!("ultralytics {version} loaded model {model}");

        Ok(Self {
            python,
            model: model.to_string(),
            version,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    fn run(&self, request: &ValidationRequest<'_>) -> Result<Output> {
        let params = request.params;
        let output = Command::new(&self.python)
            .arg("-c")
            .arg(VALIDATE_SCRIPT)
            .arg(&self.model)
            .arg(request.descriptor)
            .arg(params.batch_size.to_string())
            .arg(params.image_size.to_string())
            .arg(params.confidence.to_string())
            .arg(params.iou.to_string())
            .arg(&params.device)
            .arg(request.run_dir)
            .output()?;
        Ok(output)
    }
}

impl DetectionEngine for UltralyticsEngine {
    fn name(&self) -> &str {
        "ultralytics"
    }

    fn validate(&mut self, request: &ValidationRequest<'_>) -> Result<DetectionMetrics> {
        let output = self.run(request)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        for line in stdout.lines().filter(|line| !line.starts_with(METRICS_MARKER)) {
            log::debug!("[ultralytics] {line}");
        }

        if !output.status.success() {
            return Err(EvalError::EngineFailed(format!(
                "validation exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_metrics_output(&stdout)
    }
}
