//! Property-based tests using proptest
//!
//! These tests verify the invariants of F1 derivation, comparison ordering
//! and baseline arithmetic for arbitrary inputs.

use enhance_eval::comparison::{ComparisonRow, ComparisonTable};
use enhance_eval::metrics::{calculate_f1_score, calculate_iou, calculate_precision_recall};
use enhance_eval::nms::suppression_mask;
use enhance_eval::types::{Annotation, BoundingBox, MetricVector};
use proptest::prelude::*;

fn row(idx: usize, map50_95: f64) -> ComparisonRow {
    ComparisonRow {
        method: format!("m{idx}"),
        model: "yolov8x".to_string(),
        metrics: MetricVector::new(0.5, map50_95, 0.4, 0.6, 0.5),
    }
}

// Property: F1 is the harmonic mean of precision and recall, 0 iff p + r == 0
proptest! {
    #[test]
    fn prop_f1_harmonic_mean(
        precision in 0.0f64..=1.0,
        recall in 0.0f64..=1.0
    ) {
        let f1 = calculate_f1_score(precision, recall);

        if precision + recall > 0.0 {
            let expected = 2.0 * precision * recall / (precision + recall);
            assert!((f1 - expected).abs() < 1e-12,
                    "F1 should be harmonic mean: expected {}, got {}", expected, f1);
        } else {
            assert_eq!(f1, 0.0, "F1 should be 0 when both P and R are 0");
        }
    }

    #[test]
    fn prop_f1_symmetric(
        precision in 0.0f64..=1.0,
        recall in 0.0f64..=1.0
    ) {
        assert_eq!(calculate_f1_score(precision, recall), calculate_f1_score(recall, precision));
    }

    #[test]
    fn prop_f1_range(tp in 0usize..1000, fp in 0usize..1000, fn_ in 0usize..1000) {
        let pr = calculate_precision_recall(tp, fp, fn_);
        let f1 = calculate_f1_score(pr.precision, pr.recall);
        assert!((0.0..=1.0).contains(&f1), "F1 score should be in [0,1], got {}", f1);
        assert!(f1 <= pr.precision.max(pr.recall) + 1e-12);
    }

    #[test]
    fn prop_metric_vector_derives_f1(
        precision in 0.0f64..=1.0,
        recall in 0.0f64..=1.0
    ) {
        let metrics = MetricVector::new(0.5, 0.3, 0.2, precision, recall);
        assert_eq!(metrics.f1_score(), calculate_f1_score(precision, recall));
    }
}

// Property: Perfect precision and recall gives F1 = 1.0
#[test]
fn prop_perfect_scores() {
    let f1 = calculate_f1_score(1.0, 1.0);
    assert!((f1 - 1.0).abs() < 1e-12, "Perfect P and R should give F1=1.0");
}

// Property: the table is sorted descending and ties keep discovery order
proptest! {
    #[test]
    fn prop_table_sorted_and_stable(values in prop::collection::vec(0u8..5, 0..12)) {
        let rows: Vec<ComparisonRow> = values
            .iter()
            .enumerate()
            .map(|(idx, &v)| row(idx, f64::from(v) / 10.0))
            .collect();
        let table = ComparisonTable::new(rows);

        for pair in table.rows().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.metrics.map50_95 >= b.metrics.map50_95);
            if a.metrics.map50_95 == b.metrics.map50_95 {
                let ia: usize = a.method[1..].parse().unwrap();
                let ib: usize = b.method[1..].parse().unwrap();
                assert!(ia < ib, "ties must keep discovery order: {} before {}", a.method, b.method);
            }
        }
        assert_eq!(table.len(), values.len());
    }
}

// Property: the baseline is the minimum row and doubling it gives +100%
proptest! {
    #[test]
    fn prop_baseline_arithmetic(
        baseline in 0.01f64..0.5,
        others in prop::collection::vec(0.0f64..1.0, 1..6)
    ) {
        let mut rows = vec![row(0, baseline), row(1, baseline * 2.0)];
        rows.extend(others.iter().enumerate().map(|(i, &v)| row(i + 2, baseline + v * 0.5)));
        let table = ComparisonTable::new(rows);

        let last = table.baseline().unwrap();
        assert!(table.rows().iter().all(|r| r.metrics.map50_95 >= last.metrics.map50_95));

        let improvements = table.relative_improvements();
        assert_eq!(improvements.len(), table.len());
        let base = improvements.last().unwrap();
        assert!(base.is_baseline);
        assert_eq!(base.percent, Some(0.0));

        let doubled = improvements.iter().find(|imp| imp.method == "m1").unwrap();
        assert!((doubled.percent.unwrap() - 100.0).abs() < 1e-9);

        for imp in &improvements {
            let expected = (imp.map50_95 - baseline) / baseline * 100.0;
            assert!((imp.percent.unwrap() - expected).abs() < 1e-9);
        }
    }
}

// Property: IoU is symmetric and bounded
proptest! {
    #[test]
    fn prop_iou_symmetric_and_bounded(
        x1 in 0.0f64..1.0,
        y1 in 0.0f64..1.0,
        w1 in 0.01f64..0.5,
        h1 in 0.01f64..0.5,
        x2 in 0.0f64..1.0,
        y2 in 0.0f64..1.0,
        w2 in 0.01f64..0.5,
        h2 in 0.01f64..0.5,
    ) {
        let bbox1 = BoundingBox::new(x1, y1, w1, h1);
        let bbox2 = BoundingBox::new(x2, y2, w2, h2);

        let iou1 = calculate_iou(&bbox1, &bbox2);
        let iou2 = calculate_iou(&bbox2, &bbox1);

        assert!((iou1 - iou2).abs() < 1e-12, "IoU should be symmetric: {} vs {}", iou1, iou2);
        assert!((0.0..=1.0).contains(&iou1), "IoU should be in [0,1], got {}", iou1);
    }
}

// Property: NMS always keeps the first highest-scoring detection
proptest! {
    #[test]
    fn prop_nms_keeps_top_score(
        boxes in prop::collection::vec((0.0f64..0.8, 0.0f64..0.8, 0.05f64..0.2, 0.0f64..1.0), 1..20),
        threshold in 0.0f64..=1.0,
    ) {
        let detections: Vec<Annotation> = boxes
            .iter()
            .enumerate()
            .map(|(i, &(x, y, size, score))| Annotation {
                id: i as u64,
                image_id: 0,
                class_id: 0,
                bbox: BoundingBox::new(x, y, size, size),
                score: Some(score),
            })
            .collect();

        let mask = suppression_mask(&detections, threshold).unwrap();
        let best = detections.iter().map(Annotation::confidence).fold(f64::MIN, f64::max);
        let top = detections.iter().position(|d| d.confidence() == best).unwrap();

        assert!(mask[top], "highest-scoring detection {} must survive NMS", top);
        assert_eq!(mask.len(), detections.len());
    }
}
