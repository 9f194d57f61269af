//! Metric kernels used by the offline engine and the extractor.

pub mod iou;
pub mod ap;
pub mod precision_recall;
pub mod f1_score;

pub use iou::calculate_iou;
pub use ap::{calculate_ap, calculate_map};
pub use precision_recall::{calculate_precision_recall, PrecisionRecall};
pub use f1_score::{calculate_f1_score, find_optimal_f1_threshold};
