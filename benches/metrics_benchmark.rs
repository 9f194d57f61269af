use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use enhance_eval::comparison::{ComparisonRow, ComparisonTable};
use enhance_eval::evaluator::evaluate;
use enhance_eval::metrics::{calculate_ap, calculate_f1_score, calculate_iou};
use enhance_eval::nms::non_maximum_suppression;
use enhance_eval::threshold::generate_threshold_range;
use enhance_eval::types::{Annotation, BoundingBox, MetricVector};

fn grid_annotations(count: u64, score: Option<f64>) -> Vec<Annotation> {
    (0..count)
        .map(|i| Annotation {
            id: i,
            image_id: i / 50,
            class_id: (i % 10) as u32,
            bbox: BoundingBox::new((i % 40) as f64 * 0.025, (i / 40 % 40) as f64 * 0.025, 0.02, 0.02),
            score: score.map(|s| s - (i as f64) / 100_000.0),
        })
        .collect()
}

fn bench_iou_calculation(c: &mut Criterion) {
    let bbox1 = BoundingBox::new(0.10, 0.10, 0.30, 0.30);
    let bbox2 = BoundingBox::new(0.25, 0.25, 0.30, 0.30);

    c.bench_function("iou_single", |b| {
        b.iter(|| calculate_iou(black_box(&bbox1), black_box(&bbox2)));
    });
}

fn bench_nms(c: &mut Criterion) {
    let mut group = c.benchmark_group("nms");

    for num_boxes in [10u64, 50, 100, 500].iter() {
        let detections: Vec<Annotation> = (0..*num_boxes)
            .map(|i| Annotation {
                id: i,
                image_id: 0,
                class_id: (i % 3) as u32,
                bbox: BoundingBox::new(0.1 + (i as f64) * 0.001, 0.1, 0.3, 0.3),
                score: Some(0.9 - (i as f64) * 0.001),
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(num_boxes), num_boxes, |b, _| {
            b.iter(|| non_maximum_suppression(black_box(&detections), black_box(0.6)));
        });
    }
    group.finish();
}

fn bench_ap_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ap_calculation");

    for num_detections in [10, 50, 100, 500].iter() {
        let precision: Vec<f64> = (0..*num_detections)
            .map(|i| 1.0 - (i as f64) / (*num_detections as f64))
            .collect();
        let recall: Vec<f64> = (0..*num_detections)
            .map(|i| (i as f64) / (*num_detections as f64))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(num_detections), num_detections, |b, _| {
            b.iter(|| calculate_ap(black_box(&precision), black_box(&recall)));
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.sample_size(20);

    for count in [100u64, 1000].iter() {
        let gt = grid_annotations(*count, None);
        let preds = grid_annotations(*count, Some(0.9));

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| evaluate(black_box(&gt), black_box(&preds)));
        });
    }
    group.finish();
}

fn bench_comparison_sort(c: &mut Criterion) {
    let rows: Vec<ComparisonRow> = (0..1000)
        .map(|i| ComparisonRow {
            method: format!("m{i}"),
            model: "yolov8x".to_string(),
            metrics: MetricVector::new(0.5, ((i * 7919) % 1000) as f64 / 1000.0, 0.3, 0.6, 0.5),
        })
        .collect();

    c.bench_function("comparison_table_1000", |b| {
        b.iter(|| {
            let table = ComparisonTable::new(black_box(rows.clone()));
            table.relative_improvements()
        });
    });
}

fn bench_small_metrics(c: &mut Criterion) {
    c.bench_function("f1_calculation", |b| {
        b.iter(|| calculate_f1_score(black_box(0.8), black_box(0.7)));
    });

    c.bench_function("threshold_range_101", |b| {
        b.iter(|| generate_threshold_range(black_box(0.0), black_box(1.0), black_box(101)));
    });
}

criterion_group!(
    benches,
    bench_iou_calculation,
    bench_nms,
    bench_ap_calculation,
    bench_evaluate,
    bench_comparison_sort,
    bench_small_metrics,
);
criterion_main!(benches);
