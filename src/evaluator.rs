//! COCO-style evaluation of stored predictions against YOLO ground truth.
//!
//! Backs the offline engine only; the default engine takes its metrics from
//! the external library.

use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::matching::{calculate_pr_at_thresholds, group_annotations, match_detections, Match};
use crate::metrics::ap::{calculate_ap, calculate_map};
use crate::metrics::f1_score::find_optimal_f1_threshold;
use crate::metrics::precision_recall::calculate_precision_recall_curve;
use crate::threshold::{coco_iou_thresholds, generate_threshold_range};
use crate::types::{Annotation, DetectionMetrics};

type Groups = HashMap<(u64, u32), Vec<Annotation>>;

/// Evaluation metrics for object detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationMetrics {
    /// Mean AP over classes and IoU thresholds 0.50:0.05:0.95
    pub map: f64,
    /// Mean AP over classes at IoU=0.50
    pub ap50: f64,
    /// Mean AP over classes at IoU=0.75
    pub ap75: f64,
    /// Precision at the best-F1 confidence threshold (IoU=0.50)
    pub precision: f64,
    /// Recall at the best-F1 confidence threshold (IoU=0.50)
    pub recall: f64,
    /// Confidence threshold that maximises F1
    pub best_confidence: f64,
    /// Per-class AP averaged over IoU thresholds, sorted by class id
    pub ap_per_class: Vec<(u32, f64)>,
}

impl From<&EvaluationMetrics> for DetectionMetrics {
    fn from(metrics: &EvaluationMetrics) -> Self {
        DetectionMetrics {
            map50: Some(metrics.ap50),
            map: Some(metrics.map),
            map75: Some(metrics.ap75),
            mp: Some(metrics.precision),
            mr: Some(metrics.recall),
        }
    }
}

/// Evaluate predictions against ground truth.
///
/// Each class present in the ground truth is swept independently: predictions
/// are matched per image at every IoU threshold, a ranked precision-recall
/// curve is built across images, and AP is computed with 101-point
/// interpolation. Classes that only appear in the predictions are left out of
/// the means.
///
/// Precision and recall are reported at the confidence threshold (sampled on
/// 0.00..=1.00 in steps of 0.01) that maximises F1 at IoU=0.50.
///
/// Empty ground truth yields all-zero metrics.
pub fn evaluate(ground_truth: &[Annotation], predictions: &[Annotation]) -> Result<EvaluationMetrics> {
    let iou_thresholds = coco_iou_thresholds();
    let confidence_thresholds = generate_threshold_range(0.0, 1.0, 101)?;

    let class_ids: BTreeSet<u32> = ground_truth.iter().map(|ann| ann.class_id).collect();
    if class_ids.is_empty() {
        log::warn!("no ground-truth objects; reporting zero metrics");
        return Ok(EvaluationMetrics::default());
    }

    let gt_groups = group_annotations(ground_truth);
    let pred_groups = group_annotations(predictions);

    let mut metrics = EvaluationMetrics::default();
    let mut ap_by_iou: Vec<Vec<f64>> = vec![Vec::new(); iou_thresholds.len()];

    for &class_id in &class_ids {
        let class_aps: Vec<f64> = iou_thresholds
            .iter()
            .map(|&iou| {
                let (matches, gt_count) = collect_class_matches(&gt_groups, &pred_groups, class_id, iou);
                let is_tp: Vec<bool> = matches.iter().map(|m| m.is_true_positive).collect();
                let (precisions, recalls) = calculate_precision_recall_curve(&is_tp, gt_count);
                calculate_ap(&precisions, &recalls)
            })
            .collect();

        for (per_iou, &ap) in ap_by_iou.iter_mut().zip(&class_aps) {
            per_iou.push(ap);
        }
        metrics.ap_per_class.push((class_id, calculate_map(&class_aps)));
    }

    let per_iou_map: Vec<f64> = ap_by_iou.iter().map(|aps| calculate_map(aps)).collect();
    metrics.map = calculate_map(&per_iou_map);
    metrics.ap50 = per_iou_map[0];
    metrics.ap75 = per_iou_map[5];

    let mut all_matches = Vec::new();
    let mut total_gt = 0;
    for &class_id in &class_ids {
        let (matches, gt_count) = collect_class_matches(&gt_groups, &pred_groups, class_id, 0.5);
        all_matches.extend(matches);
        total_gt += gt_count;
    }

    let (precisions, recalls) = calculate_pr_at_thresholds(&all_matches, total_gt, &confidence_thresholds);
    let (_, best_confidence) = find_optimal_f1_threshold(&precisions, &recalls, &confidence_thresholds);
    let best_idx = confidence_thresholds
        .iter()
        .position(|&t| t == best_confidence)
        .unwrap_or(0);

    metrics.best_confidence = best_confidence;
    metrics.precision = precisions[best_idx];
    metrics.recall = recalls[best_idx];

    Ok(metrics)
}

/// Match every image for one class at one IoU threshold.
///
/// Returns the matches ranked by confidence (descending) and the number of
/// ground-truth objects of that class.
fn collect_class_matches(
    gt_groups: &Groups,
    pred_groups: &Groups,
    class_id: u32,
    iou_threshold: f64,
) -> (Vec<Match>, usize) {
    let image_ids: BTreeSet<u64> = gt_groups
        .keys()
        .chain(pred_groups.keys())
        .filter(|(_, cls)| *cls == class_id)
        .map(|(image_id, _)| *image_id)
        .collect();

    let mut matches = Vec::new();
    let mut gt_count = 0;

    for image_id in image_ids {
        let key = (image_id, class_id);
        let gts = gt_groups.get(&key).map(Vec::as_slice).unwrap_or_default();
        let preds = pred_groups.get(&key).map(Vec::as_slice).unwrap_or_default();

        gt_count += gts.len();
        matches.extend(match_detections(preds, gts, iou_threshold));
    }

    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    (matches, gt_count)
}
