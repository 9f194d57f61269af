//! Conversion of engine results into metric vectors.

use crate::error::{EvalError, Result};
use crate::types::{DetectionMetrics, MetricVector};

fn required(value: Option<f64>, name: &str) -> Result<f64> {
    let value = value.ok_or_else(|| EvalError::MissingMetric(name.to_string()))?;
    finite(value, name)
}

fn optional(value: Option<f64>, name: &str) -> Result<f64> {
    finite(value.unwrap_or(0.0), name)
}

fn finite(value: f64, name: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::MissingMetric(format!("{name} is not finite ({value})")))
    }
}

/// Strict extraction: `map50` and `map` must be present, the rest default to
/// 0.0, and every value must be finite. F1 is derived, never read.
pub fn try_extract(metrics: &DetectionMetrics) -> Result<MetricVector> {
    Ok(MetricVector::new(
        required(metrics.map50, "map50")?,
        required(metrics.map, "map")?,
        optional(metrics.map75, "map75")?,
        optional(metrics.mp, "mp")?,
        optional(metrics.mr, "mr")?,
    ))
}

/// Extract a metric vector, degrading to all zeros with a warning when the
/// engine result is unusable.
///
/// # Example
///
/// ```
/// use enhance_eval::extract::extract_metrics;
/// use enhance_eval::types::DetectionMetrics;
///
/// let partial = DetectionMetrics { map50: Some(0.6), map: Some(0.4), ..Default::default() };
/// let metrics = extract_metrics(&partial);
/// assert_eq!(metrics.map75, 0.0);
/// assert_eq!(metrics.f1_score(), 0.0);
///
/// let broken = DetectionMetrics { map50: Some(0.6), ..Default::default() };
/// assert_eq!(extract_metrics(&broken).map50, 0.0);
/// ```
pub fn extract_metrics(metrics: &DetectionMetrics) -> MetricVector {
    match try_extract(metrics) {
        Ok(vector) => vector,
        Err(err) => {
            log::warn!("failed to extract metrics: {err}");
            MetricVector::zero()
        }
    }
}
