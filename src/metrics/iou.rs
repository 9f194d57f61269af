//! Intersection over Union (IoU) calculation.

use crate::types::BoundingBox;

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
/// Degenerate boxes with zero union yield 0.0.
///
/// # Example
///
/// ```
/// use enhance_eval::metrics::iou::calculate_iou;
/// use enhance_eval::types::BoundingBox;
///
/// let a = BoundingBox::new(0.0, 0.0, 0.1, 0.1);
/// let b = BoundingBox::new(0.05, 0.05, 0.1, 0.1);
/// let iou = calculate_iou(&a, &b);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let x_left = a.x.max(b.x);
    let y_top = a.y.max(b.y);
    let x_right = a.right().min(b.right());
    let y_bottom = a.bottom().min(b.bottom());

    if x_right <= x_left || y_bottom <= y_top {
        return 0.0;
    }

    let intersection = (x_right - x_left) * (y_bottom - y_top);
    let union = a.area() + b.area() - intersection;

    if union <= 0.0 {
        return 0.0;
    }

    intersection / union
}
