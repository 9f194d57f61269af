//! Confidence and IoU threshold utilities.

use crate::error::{EvalError, Result};
use crate::types::Annotation;

/// Filter annotations by confidence score threshold.
///
/// Keeps annotations with `confidence() >= threshold`. Ground-truth
/// annotations have no score and therefore always pass.
///
/// # Errors
///
/// Returns an error if the threshold is not in the valid range [0.0, 1.0].
pub fn filter_by_confidence(annotations: &[Annotation], threshold: f64) -> Result<Vec<Annotation>> {
    validate_threshold("confidence", threshold)?;

    Ok(annotations
        .iter()
        .filter(|ann| ann.confidence() >= threshold)
        .cloned()
        .collect())
}

/// Generate evenly spaced threshold values, both ends inclusive.
///
/// # Example
///
/// ```
/// use enhance_eval::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.0, 1.0, 101).unwrap();
/// assert_eq!(thresholds.len(), 101);
/// assert_eq!(thresholds[0], 0.0);
/// assert!((thresholds[100] - 1.0).abs() < 1e-12);
/// ```
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(EvalError::InvalidThreshold(
            "number of steps must be greater than 0".to_string(),
        ));
    }

    validate_threshold("start", start)?;
    validate_threshold("end", end)?;

    if start > end {
        return Err(EvalError::InvalidThreshold(format!(
            "start threshold ({start}) must be <= end threshold ({end})"
        )));
    }

    if steps == 1 {
        return Ok(vec![start]);
    }

    let step_size = (end - start) / (steps - 1) as f64;
    Ok((0..steps).map(|i| start + step_size * i as f64).collect())
}

/// COCO IoU thresholds 0.50:0.05:0.95.
pub fn coco_iou_thresholds() -> Vec<f64> {
    (0..10).map(|i| 0.5 + 0.05 * i as f64).collect()
}

/// Validate that a named threshold is in the valid range [0.0, 1.0].
pub fn validate_threshold(name: &str, threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EvalError::InvalidThreshold(format!(
            "{name} threshold must be between 0.0 and 1.0, got {threshold}"
        )));
    }
    Ok(())
}
