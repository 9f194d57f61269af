//! Precision and Recall calculation.

/// Container for precision and recall values.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Calculate precision and recall from TP, FP, and FN counts.
///
/// Both values are 0.0 when their denominator is zero.
///
/// # Example
///
/// ```
/// use enhance_eval::metrics::precision_recall::calculate_precision_recall;
///
/// let pr = calculate_precision_recall(8, 2, 3);
/// assert_eq!(pr.precision, 0.8);
/// assert!((pr.recall - 0.7272).abs() < 0.001);
/// ```
pub fn calculate_precision_recall(
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
) -> PrecisionRecall {
    let precision = ratio(true_positives, true_positives + false_positives);
    let recall = ratio(true_positives, true_positives + false_negatives);

    PrecisionRecall {
        precision,
        recall,
        true_positives,
        false_positives,
        false_negatives,
    }
}

/// Build the cumulative precision/recall curve of a ranked detection list.
///
/// `is_true_positive` must already be sorted by confidence, highest first.
/// Returns `(precisions, recalls)`, one entry per detection.
pub fn calculate_precision_recall_curve(
    is_true_positive: &[bool],
    num_ground_truth: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut precisions = Vec::with_capacity(is_true_positive.len());
    let mut recalls = Vec::with_capacity(is_true_positive.len());
    let mut tp = 0;

    for (rank, &is_tp) in is_true_positive.iter().enumerate() {
        if is_tp {
            tp += 1;
        }
        precisions.push(ratio(tp, rank + 1));
        recalls.push(ratio(tp, num_ground_truth));
    }

    (precisions, recalls)
}

/// Interpolate precision values at the 101 COCO recall levels (0.00, 0.01, ..., 1.00).
///
/// The interpolated precision at a level is the maximum precision observed at
/// any recall greater than or equal to that level.
pub fn interpolate_precision(precision: &[f64], recall: &[f64]) -> Vec<f64> {
    (0..=100)
        .map(|i| {
            let level = i as f64 / 100.0;
            precision
                .iter()
                .zip(recall)
                .filter(|(_, &r)| r >= level)
                .map(|(&p, _)| p)
                .fold(0.0f64, f64::max)
        })
        .collect()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
