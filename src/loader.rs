//! Loading of YOLO-format label and prediction text files.
//!
//! Ground-truth lines are `class cx cy w h`; prediction lines carry a sixth
//! column with the confidence score. Coordinates are normalised to [0, 1].

use std::fs;
use std::path::Path;

use crate::error::{EvalError, Result};
use crate::types::{Annotation, BoundingBox};

/// Which flavour of YOLO text file is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// `class cx cy w h`
    GroundTruth,
    /// `class cx cy w h conf`
    Prediction,
}

impl LabelKind {
    fn columns(self) -> usize {
        match self {
            LabelKind::GroundTruth => 5,
            LabelKind::Prediction => 6,
        }
    }
}

/// Parse the contents of a YOLO text file.
///
/// Blank lines are skipped. Annotation ids are assigned sequentially starting
/// at `first_id`, in file order. `source` is only used for error messages.
///
/// # Errors
///
/// Returns [`EvalError::InvalidLabel`] for a wrong column count, an
/// unparsable number, a negative class id, a non-positive box size, or a
/// confidence outside [0, 1].
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use enhance_eval::loader::{parse_labels, LabelKind};
///
/// let text = "2 0.5 0.5 0.2 0.1\n\n0 0.25 0.25 0.1 0.1\n";
/// let labels = parse_labels(text, LabelKind::GroundTruth, 7, 0, Path::new("a.txt")).unwrap();
/// assert_eq!(labels.len(), 2);
/// assert_eq!(labels[0].class_id, 2);
/// assert_eq!(labels[1].image_id, 7);
/// ```
pub fn parse_labels(
    text: &str,
    kind: LabelKind,
    image_id: u64,
    first_id: u64,
    source: &Path,
) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let invalid = |reason: String| EvalError::InvalidLabel {
            path: source.to_path_buf(),
            line: index + 1,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != kind.columns() {
            return Err(invalid(format!(
                "expected {} columns, got {}",
                kind.columns(),
                fields.len()
            )));
        }

        let class_id: u32 = fields[0]
            .parse()
            .map_err(|_| invalid(format!("invalid class id '{}'", fields[0])))?;

        let mut values = [0.0f64; 5];
        for (slot, field) in values.iter_mut().zip(&fields[1..]) {
            *slot = field
                .parse()
                .map_err(|_| invalid(format!("invalid number '{field}'")))?;
        }

        let [cx, cy, width, height, confidence] = values;
        let bbox = BoundingBox::from_center(cx, cy, width, height);
        if !bbox.is_valid() {
            return Err(invalid(format!("non-positive box size {width}x{height}")));
        }

        let score = match kind {
            LabelKind::GroundTruth => None,
            LabelKind::Prediction => {
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(invalid(format!("confidence {confidence} outside [0, 1]")));
                }
                Some(confidence)
            }
        };

        annotations.push(Annotation {
            id: first_id + annotations.len() as u64,
            image_id,
            class_id,
            bbox,
            score,
        });
    }

    Ok(annotations)
}

/// Load a YOLO text file. A missing file means "no objects" and yields an
/// empty list, matching how YOLO treats background images.
pub fn load_label_file(
    path: &Path,
    kind: LabelKind,
    image_id: u64,
    first_id: u64,
) -> Result<Vec<Annotation>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    parse_labels(&text, kind, image_id, first_id, path)
}
