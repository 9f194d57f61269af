//! Harness configuration: defaults, validation parameters and the class taxonomy.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::threshold::validate_threshold;
use crate::types::Method;

/// Default dataset root holding `images/{method}` and `labels/val`.
pub const DEFAULT_DATA_ROOT: &str = "data/bdd100k_exp";

/// Default root for per-method results.
pub const DEFAULT_OUTPUT_ROOT: &str = "output/bdd100k_exp";

/// Default detector weights.
pub const DEFAULT_MODEL: &str = "yolov8x.pt";

/// Default directory for generated dataset descriptors.
pub const DEFAULT_CONFIG_DIR: &str = "config/yolo_configs";

/// Image file extensions recognised by the stager (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// BDD100K detection taxonomy, indexed by class id.
pub const BDD100K_CLASSES: [&str; 10] = [
    "pedestrian",
    "rider",
    "car",
    "truck",
    "bus",
    "train",
    "motorcycle",
    "bicycle",
    "traffic light",
    "traffic sign",
];

/// Class id to class name mapping written into every dataset descriptor.
pub fn class_names() -> BTreeMap<u32, String> {
    BDD100K_CLASSES
        .iter()
        .enumerate()
        .map(|(id, name)| (id as u32, name.to_string()))
        .collect()
}

/// Fixed parameters passed to every validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationParams {
    pub batch_size: usize,
    pub image_size: u32,
    /// Confidence threshold
    pub confidence: f64,
    /// NMS IoU threshold
    pub iou: f64,
    /// Device selector: empty for auto, `cpu`, `0`, `0,1`, ...
    pub device: String,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            batch_size: 16,
            image_size: 640,
            confidence: 0.001,
            iou: 0.6,
            device: String::new(),
        }
    }
}

impl ValidationParams {
    /// Check that thresholds lie in [0, 1] and sizes are positive.
    pub fn validate(&self) -> Result<()> {
        validate_threshold("confidence", self.confidence)?;
        validate_threshold("iou", self.iou)?;
        if self.batch_size == 0 {
            return Err(EvalError::InvalidParameter("batch size must be positive".to_string()));
        }
        if self.image_size == 0 {
            return Err(EvalError::InvalidParameter("image size must be positive".to_string()));
        }
        Ok(())
    }

    /// Device label for logs.
    pub fn device_label(&self) -> &str {
        if self.device.is_empty() {
            "auto"
        } else {
            &self.device
        }
    }
}

/// Everything the evaluation driver needs besides the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Model weights path or identifier.
    pub model: String,
    pub data_root: PathBuf,
    pub output_root: PathBuf,
    /// Where dataset descriptors are written.
    pub config_dir: PathBuf,
    /// Methods to evaluate, in order.
    pub methods: Vec<Method>,
    pub params: ValidationParams,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            methods: Method::ALL.to_vec(),
            params: ValidationParams::default(),
        }
    }
}

impl HarnessConfig {
    /// Load a configuration from a JSON file. Absent keys keep their defaults.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use enhance_eval::config::HarnessConfig;
    ///
    /// let config = HarnessConfig::from_file("harness.json").unwrap();
    /// println!("evaluating {:?}", config.methods);
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: HarnessConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameters and that at least one method is selected.
    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(EvalError::InvalidParameter("no methods selected".to_string()));
        }
        self.params.validate()
    }

    /// Model identifier used in persisted results: the file stem of the weights path.
    ///
    /// ```
    /// use enhance_eval::config::HarnessConfig;
    ///
    /// let config = HarnessConfig { model: "weights/yolov8x.pt".to_string(), ..Default::default() };
    /// assert_eq!(config.model_name(), "yolov8x");
    /// ```
    pub fn model_name(&self) -> String {
        Path::new(&self.model)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.model.clone())
    }

    /// Per-method result directory.
    pub fn method_output_dir(&self, method: Method) -> PathBuf {
        self.output_root.join(method.as_str())
    }
}
