//! Class-aware Non-Maximum Suppression (`NMS`) for stored predictions.
//!
//! Boxes only suppress boxes of the same image and class, mirroring the
//! per-class NMS that detection engines run before validation. Used by the
//! offline engine on stored predictions.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::metrics::iou::calculate_iou;
use crate::threshold::validate_threshold;
use crate::types::Annotation;

/// Compute the keep mask for a set of detections that all share one image and class.
///
/// Detections are visited in order of decreasing score; each kept detection
/// suppresses every later one whose IoU with it exceeds `iou_threshold`.
/// The mask is indexed like the input slice.
///
/// # Errors
///
/// Returns error if `iou_threshold` is not in range [0.0, 1.0]
pub fn suppression_mask(detections: &[Annotation], iou_threshold: f64) -> Result<Vec<bool>> {
    validate_threshold("iou", iou_threshold)?;

    let n = detections.len();
    let mut keep_mask = vec![true; n];

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        detections[b]
            .confidence()
            .partial_cmp(&detections[a].confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (rank, &i) in order.iter().enumerate() {
        if !keep_mask[i] {
            continue;
        }
        for &j in &order[rank + 1..] {
            if keep_mask[j] && calculate_iou(&detections[i].bbox, &detections[j].bbox) > iou_threshold {
                keep_mask[j] = false;
            }
        }
    }

    Ok(keep_mask)
}

/// Apply class-aware NMS and return the surviving detections.
///
/// Output is grouped by `(image_id, class_id)` in ascending key order, with
/// input order preserved inside each group.
///
/// # Example
///
/// ```
/// use enhance_eval::nms::non_maximum_suppression;
/// use enhance_eval::types::{Annotation, BoundingBox};
///
/// let det = |id, class_id, x, score| Annotation {
///     id,
///     image_id: 1,
///     class_id,
///     bbox: BoundingBox::new(x, 0.1, 0.4, 0.4),
///     score: Some(score),
/// };
/// let detections = vec![det(0, 2, 0.10, 0.9), det(1, 2, 0.12, 0.8), det(2, 3, 0.12, 0.7)];
///
/// let kept = non_maximum_suppression(&detections, 0.6).unwrap();
/// let ids: Vec<u64> = kept.iter().map(|d| d.id).collect();
/// assert_eq!(ids, vec![0, 2]);
/// ```
pub fn non_maximum_suppression(detections: &[Annotation], iou_threshold: f64) -> Result<Vec<Annotation>> {
    validate_threshold("iou", iou_threshold)?;

    let mut groups: BTreeMap<(u64, u32), Vec<Annotation>> = BTreeMap::new();
    for detection in detections {
        groups
            .entry((detection.image_id, detection.class_id))
            .or_default()
            .push(detection.clone());
    }

    let mut kept = Vec::with_capacity(detections.len());
    for group in groups.into_values() {
        let mask = suppression_mask(&group, iou_threshold)?;
        kept.extend(
            group
                .into_iter()
                .zip(mask)
                .filter_map(|(detection, keep)| keep.then_some(detection)),
        );
    }

    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn detection(id: u64, image_id: u64, class_id: u32, bbox: [f64; 4], score: f64) -> Annotation {
        Annotation {
            id,
            image_id,
            class_id,
            bbox: BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
            score: Some(score),
        }
    }

    #[test]
    fn test_nms_empty_input() {
        assert!(suppression_mask(&[], 0.5).unwrap().is_empty());
        assert!(non_maximum_suppression(&[], 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_nms_high_overlap() {
        let detections = vec![
            detection(0, 1, 0, [10.0, 10.0, 40.0, 40.0], 0.9),
            detection(1, 1, 0, [15.0, 15.0, 40.0, 40.0], 0.8),
        ];
        assert_eq!(suppression_mask(&detections, 0.5).unwrap(), vec![true, false]);
    }

    #[test]
    fn test_nms_score_ordering() {
        // Lower-score box first: the higher score still wins
        let detections = vec![
            detection(0, 1, 0, [10.0, 10.0, 40.0, 40.0], 0.7),
            detection(1, 1, 0, [15.0, 15.0, 40.0, 40.0], 0.9),
        ];
        assert_eq!(suppression_mask(&detections, 0.5).unwrap(), vec![false, true]);
    }

    #[test]
    fn test_nms_chain_is_not_transitive() {
        // 0 suppresses 1, but 2 only overlaps 1, so it survives
        let detections = vec![
            detection(0, 1, 0, [0.0, 0.0, 10.0, 10.0], 0.9),
            detection(1, 1, 0, [2.0, 0.0, 10.0, 10.0], 0.8),
            detection(2, 1, 0, [9.0, 0.0, 10.0, 10.0], 0.7),
        ];
        assert_eq!(suppression_mask(&detections, 0.5).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_nms_is_class_and_image_aware() {
        let detections = vec![
            detection(0, 1, 0, [10.0, 10.0, 40.0, 40.0], 0.9),
            detection(1, 1, 1, [10.0, 10.0, 40.0, 40.0], 0.8),
            detection(2, 2, 0, [10.0, 10.0, 40.0, 40.0], 0.7),
        ];
        let kept = non_maximum_suppression(&detections, 0.5).unwrap();
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_nms_invalid_threshold() {
        let detections = vec![detection(0, 1, 0, [0.0, 0.0, 10.0, 10.0], 0.9)];
        assert!(non_maximum_suppression(&detections, 1.5).is_err());
        assert!(non_maximum_suppression(&detections, -0.1).is_err());
    }
}
