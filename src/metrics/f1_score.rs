//! F1 Score calculation.

/// Calculate F1 score from precision and recall.
///
/// F1 score is the harmonic mean of precision and recall:
/// F1 = 2 × (Precision × Recall) / (Precision + Recall)
///
/// Returns 0.0 if both precision and recall are 0. Every F1 value the
/// harness reports or persists goes through this function.
///
/// # Example
///
/// ```
/// use enhance_eval::metrics::f1_score::calculate_f1_score;
///
/// let f1 = calculate_f1_score(0.8, 0.6);
/// assert!((f1 - 0.6857).abs() < 0.001);
/// ```
pub fn calculate_f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }

    2.0 * (precision * recall) / (precision + recall)
}

/// Find the best F1 score and its confidence threshold on a sampled curve.
///
/// The three slices are read in lockstep up to the shortest length. Ties keep
/// the earliest threshold. Returns `(best_f1, best_threshold)`, or
/// `(0.0, 0.0)` when no point has a positive F1.
///
/// # Example
///
/// ```
/// use enhance_eval::metrics::f1_score::find_optimal_f1_threshold;
///
/// let precisions = vec![0.5, 0.9, 1.0];
/// let recalls = vec![1.0, 0.8, 0.1];
/// let thresholds = vec![0.1, 0.5, 0.9];
///
/// let (f1, threshold) = find_optimal_f1_threshold(&precisions, &recalls, &thresholds);
/// assert_eq!(threshold, 0.5);
/// assert!(f1 > 0.84);
/// ```
pub fn find_optimal_f1_threshold(
    precisions: &[f64],
    recalls: &[f64],
    thresholds: &[f64],
) -> (f64, f64) {
    precisions
        .iter()
        .zip(recalls)
        .zip(thresholds)
        .fold((0.0, 0.0), |(best_f1, best_threshold), ((&p, &r), &t)| {
            let f1 = calculate_f1_score(p, r);
            if f1 > best_f1 {
                (f1, t)
            } else {
                (best_f1, best_threshold)
            }
        })
}
