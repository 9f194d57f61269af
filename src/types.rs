//! Core data types: methods, metric vectors, persisted results and the
//! detection primitives used by the offline engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::metrics::f1_score::calculate_f1_score;

/// Image enhancement condition under which the detector is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Unprocessed images.
    Raw,
    /// PWGCM colour enhancement.
    Pwgcm,
    /// HSV adjustment.
    Hsv,
}

impl Method {
    /// Every method, in default evaluation order.
    pub const ALL: [Method; 3] = [Method::Raw, Method::Pwgcm, Method::Hsv];

    /// Lowercase tag used for directory and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Raw => "raw",
            Method::Pwgcm => "pwgcm",
            Method::Hsv => "hsv",
        }
    }

    /// Parse a list of method tags.
    ///
    /// Each entry may itself be a comma-separated list, so both
    /// `["raw", "hsv"]` and `["raw,hsv"]` are accepted. Blank entries are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use enhance_eval::types::Method;
    ///
    /// let methods = Method::parse_list(&["raw,pwgcm".to_string(), "HSV".to_string()]).unwrap();
    /// assert_eq!(methods, vec![Method::Raw, Method::Pwgcm, Method::Hsv]);
    /// ```
    pub fn parse_list<S: AsRef<str>>(values: &[S]) -> Result<Vec<Method>> {
        values
            .iter()
            .flat_map(|value| value.as_ref().split(','))
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(Method::from_str)
            .collect()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Method::Raw),
            "pwgcm" => Ok(Method::Pwgcm),
            "hsv" => Ok(Method::Hsv),
            _ => Err(EvalError::UnknownMethod(s.to_string())),
        }
    }
}

/// Metric names in persisted order.
pub const METRIC_NAMES: [&str; 6] = [
    "mAP@0.5",
    "mAP@0.5:0.95",
    "mAP@0.75",
    "precision",
    "recall",
    "f1_score",
];

/// Fixed vector of detection accuracy metrics for one evaluation run.
///
/// `f1_score` is never stored independently: it is derived from precision and
/// recall on construction and again whenever a vector is deserialized, so a
/// tampered or stale value on disk is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "StoredMetrics")]
pub struct MetricVector {
    /// mAP at IoU 0.5.
    #[serde(rename = "mAP@0.5")]
    pub map50: f64,
    /// mAP averaged over IoU 0.5:0.05:0.95.
    #[serde(rename = "mAP@0.5:0.95")]
    pub map50_95: f64,
    /// mAP at IoU 0.75.
    #[serde(rename = "mAP@0.75")]
    pub map75: f64,
    /// Mean precision.
    pub precision: f64,
    /// Mean recall.
    pub recall: f64,
    f1_score: f64,
}

impl MetricVector {
    /// Build a metric vector, deriving F1 from precision and recall.
    ///
    /// # Example
    ///
    /// ```
    /// use enhance_eval::types::MetricVector;
    ///
    /// let metrics = MetricVector::new(0.65, 0.43, 0.47, 0.8, 0.6);
    /// assert!((metrics.f1_score() - 0.685714).abs() < 1e-5);
    /// ```
    pub fn new(map50: f64, map50_95: f64, map75: f64, precision: f64, recall: f64) -> Self {
        Self {
            map50,
            map50_95,
            map75,
            precision,
            recall,
            f1_score: calculate_f1_score(precision, recall),
        }
    }

    /// All-zero vector reported when extraction fails.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Harmonic mean of precision and recall.
    pub fn f1_score(&self) -> f64 {
        self.f1_score
    }

    /// Look up a metric by its persisted name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "mAP@0.5" => Some(self.map50),
            "mAP@0.5:0.95" => Some(self.map50_95),
            "mAP@0.75" => Some(self.map75),
            "precision" => Some(self.precision),
            "recall" => Some(self.recall),
            "f1_score" => Some(self.f1_score),
            _ => None,
        }
    }

    /// Name/value pairs in persisted order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            (METRIC_NAMES[0], self.map50),
            (METRIC_NAMES[1], self.map50_95),
            (METRIC_NAMES[2], self.map75),
            (METRIC_NAMES[3], self.precision),
            (METRIC_NAMES[4], self.recall),
            (METRIC_NAMES[5], self.f1_score),
        ]
    }
}

/// On-disk form of a metric vector. Absent keys read as 0.0 and any stored
/// `f1_score` is dropped.
#[derive(Deserialize)]
struct StoredMetrics {
    #[serde(rename = "mAP@0.5", default)]
    map50: f64,
    #[serde(rename = "mAP@0.5:0.95", default)]
    map50_95: f64,
    #[serde(rename = "mAP@0.75", default)]
    map75: f64,
    #[serde(default)]
    precision: f64,
    #[serde(default)]
    recall: f64,
}

impl From<StoredMetrics> for MetricVector {
    fn from(stored: StoredMetrics) -> Self {
        MetricVector::new(
            stored.map50,
            stored.map50_95,
            stored.map75,
            stored.precision,
            stored.recall,
        )
    }
}

/// Result of evaluating one model under one method, as persisted in
/// `{output_root}/{method}/metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    pub model: String,
    pub method: Method,
    pub metrics: MetricVector,
}

/// Typed result returned by a detection engine's validation call.
///
/// Every attribute is optional: engines report what they have and the
/// extractor decides which absences are fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetrics {
    /// mAP at IoU 0.5.
    pub map50: Option<f64>,
    /// mAP at IoU 0.5:0.95.
    pub map: Option<f64>,
    /// mAP at IoU 0.75.
    pub map75: Option<f64>,
    /// Mean precision.
    pub mp: Option<f64>,
    /// Mean recall.
    pub mr: Option<f64>,
}

/// Represents a bounding box in normalised image coordinates (x, y, width, height).
///
/// `x`/`y` are the top-left corner. IoU is invariant to independent scaling of
/// the two axes, so boxes never need to be converted to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a bounding box from YOLO centre coordinates.
    pub fn from_center(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// Get the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Get the right coordinate (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom coordinate (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the bounding box is valid (positive dimensions).
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// One ground-truth object or predicted detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: u64,
    pub image_id: u64,
    pub class_id: u32,
    pub bbox: BoundingBox,
    /// Confidence score (predictions only)
    pub score: Option<f64>,
}

impl Annotation {
    /// Get the confidence score, defaulting to 1.0 if not present.
    pub fn confidence(&self) -> f64 {
        self.score.unwrap_or(1.0)
    }
}
