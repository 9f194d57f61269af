//! Average Precision (AP) and mean Average Precision (mAP) calculation.

use crate::metrics::precision_recall::interpolate_precision;

/// Calculate Average Precision (AP) from a precision-recall curve.
///
/// Uses the COCO-style 101-point interpolation method.
///
/// # Arguments
///
/// * `precisions` - Precision values, one per ranked detection
/// * `recalls` - Recall values, one per ranked detection (non-decreasing)
///
/// # Example
///
/// ```
/// use enhance_eval::metrics::ap::calculate_ap;
///
/// let precisions = vec![1.0, 1.0, 0.67, 0.75, 0.6];
/// let recalls = vec![0.25, 0.5, 0.5, 0.75, 0.75];
/// let ap = calculate_ap(&precisions, &recalls);
/// assert!(ap >= 0.0 && ap <= 1.0);
/// ```
pub fn calculate_ap(precisions: &[f64], recalls: &[f64]) -> f64 {
    if precisions.is_empty() || recalls.is_empty() {
        return 0.0;
    }

    let interpolated = interpolate_precision(precisions, recalls);
    interpolated.iter().sum::<f64>() / interpolated.len() as f64
}

/// Calculate the mean of a set of AP values.
///
/// Used both across classes and across IoU thresholds.
///
/// # Example
///
/// ```
/// use enhance_eval::metrics::ap::calculate_map;
///
/// let map = calculate_map(&[0.8, 0.9, 0.75, 0.85]);
/// assert!((map - 0.825).abs() < 1e-10);
/// ```
pub fn calculate_map(aps: &[f64]) -> f64 {
    if aps.is_empty() {
        return 0.0;
    }

    aps.iter().sum::<f64>() / aps.len() as f64
}
