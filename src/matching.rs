//! Detection matching utilities for the offline evaluator.

use std::collections::HashMap;

use crate::metrics::iou::calculate_iou;
use crate::metrics::precision_recall::calculate_precision_recall;
use crate::types::Annotation;

/// Represents a matched detection with its ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub prediction_id: u64,
    pub ground_truth_id: Option<u64>,
    pub iou: f64,
    pub is_true_positive: bool,
    pub confidence: f64,
}

/// Match predictions to ground truth annotations for a single image and class.
///
/// Uses greedy matching: predictions are visited by confidence (descending),
/// and each prediction claims the highest-IoU ground truth that is still
/// unmatched. A claim only counts as a true positive when the IoU reaches
/// `iou_threshold`.
///
/// Returns one [`Match`] per prediction, sorted by confidence (descending).
pub fn match_detections(
    predictions: &[Annotation],
    ground_truths: &[Annotation],
    iou_threshold: f64,
) -> Vec<Match> {
    let mut order: Vec<usize> = (0..predictions.len()).collect();
    order.sort_by(|&a, &b| {
        predictions[b]
            .confidence()
            .partial_cmp(&predictions[a].confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut claimed = vec![false; ground_truths.len()];

    order
        .into_iter()
        .map(|pred_idx| {
            let pred = &predictions[pred_idx];

            let best = ground_truths
                .iter()
                .enumerate()
                .filter(|(gt_idx, _)| !claimed[*gt_idx])
                .map(|(gt_idx, gt)| (gt_idx, calculate_iou(&pred.bbox, &gt.bbox)))
                .fold(None, |best: Option<(usize, f64)>, (gt_idx, iou)| match best {
                    Some((_, best_iou)) if best_iou >= iou => best,
                    _ if iou > 0.0 => Some((gt_idx, iou)),
                    _ => best,
                });

            let (iou, ground_truth_id) = match best {
                Some((gt_idx, iou)) if iou >= iou_threshold => {
                    claimed[gt_idx] = true;
                    (iou, Some(ground_truths[gt_idx].id))
                }
                Some((_, iou)) => (iou, None),
                None => (0.0, None),
            };

            Match {
                prediction_id: pred.id,
                ground_truth_id,
                iou,
                is_true_positive: ground_truth_id.is_some(),
                confidence: pred.confidence(),
            }
        })
        .collect()
}

/// Group annotations by `(image_id, class_id)`.
pub fn group_annotations(annotations: &[Annotation]) -> HashMap<(u64, u32), Vec<Annotation>> {
    let mut groups: HashMap<(u64, u32), Vec<Annotation>> = HashMap::new();

    for annotation in annotations {
        groups
            .entry((annotation.image_id, annotation.class_id))
            .or_default()
            .push(annotation.clone());
    }

    groups
}

/// Calculate precision and recall at each confidence threshold.
///
/// A match counts at a threshold when its confidence is `>=` the threshold.
///
/// Returns `(precisions, recalls)`, indexed like `confidence_thresholds`.
pub fn calculate_pr_at_thresholds(
    matches: &[Match],
    total_ground_truths: usize,
    confidence_thresholds: &[f64],
) -> (Vec<f64>, Vec<f64>) {
    confidence_thresholds
        .iter()
        .map(|&threshold| {
            let (tp, fp) = matches
                .iter()
                .filter(|m| m.confidence >= threshold)
                .fold((0usize, 0usize), |(tp, fp), m| {
                    if m.is_true_positive {
                        (tp + 1, fp)
                    } else {
                        (tp, fp + 1)
                    }
                });
            let pr = calculate_precision_recall(tp, fp, total_ground_truths.saturating_sub(tp));
            (pr.precision, pr.recall)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn annotation(id: u64, bbox: [f64; 4], score: Option<f64>) -> Annotation {
        Annotation {
            id,
            image_id: 1,
            class_id: 2,
            bbox: BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
            score,
        }
    }

    #[test]
    fn test_perfect_match() {
        let predictions = vec![annotation(1, [10.0, 10.0, 50.0, 50.0], Some(0.9))];
        let ground_truths = vec![annotation(7, [10.0, 10.0, 50.0, 50.0], None)];

        let matches = match_detections(&predictions, &ground_truths, 0.5);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].is_true_positive);
        assert_eq!(matches[0].ground_truth_id, Some(7));
        assert!(matches[0].iou > 0.99);
    }

    #[test]
    fn test_no_match() {
        let predictions = vec![annotation(1, [10.0, 10.0, 50.0, 50.0], Some(0.9))];
        let ground_truths = vec![annotation(1, [200.0, 200.0, 50.0, 50.0], None)];

        let matches = match_detections(&predictions, &ground_truths, 0.5);
        assert_eq!(matches.len(), 1);
        assert!(!matches[0].is_true_positive);
        assert_eq!(matches[0].iou, 0.0);
    }

    #[test]
    fn test_below_threshold_does_not_claim() {
        // Low-IoU prediction ranks first but must not consume the ground truth
        let predictions = vec![
            annotation(1, [30.0, 30.0, 50.0, 50.0], Some(0.95)),
            annotation(2, [10.0, 10.0, 50.0, 50.0], Some(0.5)),
        ];
        let ground_truths = vec![annotation(1, [10.0, 10.0, 50.0, 50.0], None)];

        let matches = match_detections(&predictions, &ground_truths, 0.5);
        assert!(!matches[0].is_true_positive);
        assert!(matches[1].is_true_positive);
    }

    #[test]
    fn test_confidence_sorting() {
        let predictions = vec![
            annotation(1, [10.0, 10.0, 50.0, 50.0], Some(0.5)),
            annotation(2, [20.0, 20.0, 50.0, 50.0], Some(0.9)),
            annotation(3, [30.0, 30.0, 50.0, 50.0], Some(0.7)),
        ];
        let ground_truths = vec![annotation(1, [20.0, 20.0, 50.0, 50.0], None)];

        let matches = match_detections(&predictions, &ground_truths, 0.5);
        let order: Vec<u64> = matches.iter().map(|m| m.prediction_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(matches[0].is_true_positive);
        assert!(!matches[1].is_true_positive);
        assert!(!matches[2].is_true_positive);
    }

    #[test]
    fn test_group_annotations() {
        let mut annotations = vec![
            annotation(1, [10.0, 10.0, 50.0, 50.0], None),
            annotation(2, [20.0, 20.0, 50.0, 50.0], None),
        ];
        annotations.push(Annotation { class_id: 5, ..annotations[0].clone() });
        annotations.push(Annotation { image_id: 2, ..annotations[0].clone() });

        let groups = group_annotations(&annotations);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&(1, 2)].len(), 2);
        assert_eq!(groups[&(1, 5)].len(), 1);
        assert_eq!(groups[&(2, 2)].len(), 1);
    }

    #[test]
    fn test_pr_at_thresholds() {
        let matches = vec![
            Match { prediction_id: 1, ground_truth_id: Some(1), iou: 0.9, is_true_positive: true, confidence: 0.9 },
            Match { prediction_id: 2, ground_truth_id: None, iou: 0.1, is_true_positive: false, confidence: 0.6 },
            Match { prediction_id: 3, ground_truth_id: Some(2), iou: 0.8, is_true_positive: true, confidence: 0.3 },
        ];

        let (precisions, recalls) = calculate_pr_at_thresholds(&matches, 4, &[0.0, 0.5, 0.95]);
        assert!((precisions[0] - 2.0 / 3.0).abs() < 1e-10);
        assert!((recalls[0] - 0.5).abs() < 1e-10);
        assert!((precisions[1] - 0.5).abs() < 1e-10);
        assert!((recalls[1] - 0.25).abs() < 1e-10);
        assert_eq!(precisions[2], 0.0);
        assert_eq!(recalls[2], 0.0);
    }
}
