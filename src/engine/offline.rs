//! Offline engine: scores stored YOLO-format predictions against the
//! dataset's ground-truth labels without running a detector.
//!
//! An alternative to the default [`UltralyticsEngine`](super::UltralyticsEngine),
//! which delegates both inference and mAP computation to the external
//! library. Selected with `evaluate --engine offline`; the mAP kernels in
//! [`crate::evaluator`] are only used from here.

use std::path::{Path, PathBuf};

use super::{DetectionEngine, ValidationRequest};
use crate::descriptor::DatasetDescriptor;
use crate::error::{EvalError, Result};
use crate::evaluator::{evaluate, EvaluationMetrics};
use crate::loader::{load_label_file, LabelKind};
use crate::nms::non_maximum_suppression;
use crate::staging::collect_image_files;
use crate::threshold::filter_by_confidence;
use crate::types::{Annotation, DetectionMetrics, Method};

/// Ground truth and predictions for one method, keyed by image index.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub images: usize,
    pub ground_truth: Vec<Annotation>,
    pub predictions: Vec<Annotation>,
}

/// Reads predictions from `{predictions_root}/{method}/{stem}.txt`.
#[derive(Debug, Clone)]
pub struct OfflineEngine {
    predictions_root: PathBuf,
}

impl OfflineEngine {
    pub fn new<P: Into<PathBuf>>(predictions_root: P) -> Self {
        Self {
            predictions_root: predictions_root.into(),
        }
    }

    pub fn predictions_dir(&self, method: Method) -> PathBuf {
        self.predictions_root.join(method.as_str())
    }

    /// Load labels and predictions for every image in the descriptor's `val`
    /// directory. Images without a label or prediction file contribute no
    /// objects of that kind.
    pub fn load(&self, descriptor: &DatasetDescriptor, method: Method) -> Result<LoadedDataset> {
        let images = collect_image_files(&descriptor.val);
        if images.is_empty() {
            return Err(EvalError::EmptyDataset(format!(
                "no images under {}",
                descriptor.val.display()
            )));
        }

        let labels_dir = descriptor.labels_dir();
        let predictions_dir = self.predictions_dir(method);
        if !predictions_dir.is_dir() {
            log::warn!("prediction directory {} does not exist", predictions_dir.display());
        }

        let mut dataset = LoadedDataset {
            images: images.len(),
            ..Default::default()
        };

        for (image_id, image) in images.iter().enumerate() {
            let Some(stem) = image.file_stem() else {
                continue;
            };
            let file_name = Path::new(stem).with_extension("txt");
            let image_id = image_id as u64;

            let gt = load_label_file(
                &labels_dir.join(&file_name),
                LabelKind::GroundTruth,
                image_id,
                dataset.ground_truth.len() as u64,
            )?;
            dataset.ground_truth.extend(gt);

            let preds = load_label_file(
                &predictions_dir.join(&file_name),
                LabelKind::Prediction,
                image_id,
                dataset.predictions.len() as u64,
            )?;
            dataset.predictions.extend(preds);
        }

        Ok(dataset)
    }

    /// Confidence filter, class-aware NMS, then COCO-style evaluation.
    pub fn score(&self, dataset: &LoadedDataset, confidence: f64, iou: f64) -> Result<EvaluationMetrics> {
        let confident = filter_by_confidence(&dataset.predictions, confidence)?;
        let kept = non_maximum_suppression(&confident, iou)?;
        log::debug!(
            "{} predictions, {} above confidence {confidence}, {} after NMS",
            dataset.predictions.len(),
            confident.len(),
            kept.len()
        );
        evaluate(&dataset.ground_truth, &kept)
    }
}

impl DetectionEngine for OfflineEngine {
    fn name(&self) -> &str {
        "offline"
    }

    fn validate(&mut self, request: &ValidationRequest<'_>) -> Result<DetectionMetrics> {
        let descriptor = DatasetDescriptor::load(request.descriptor)?;
        let dataset = self.load(&descriptor, request.method)?;
        log::info!(
            "{}: {} images, {} ground-truth objects, {} predictions",
            request.method,
            dataset.images,
            dataset.ground_truth.len(),
            dataset.predictions.len()
        );

        let metrics = self.score(&dataset, request.params.confidence, request.params.iou)?;
        log::info!("best F1 confidence threshold: {:.2}", metrics.best_confidence);
        Ok(DetectionMetrics::from(&metrics))
    }
}
