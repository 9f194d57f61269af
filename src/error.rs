//! Error types for the enhance-eval harness.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for enhance-eval operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Error types that can occur while staging, evaluating, or reporting.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during YAML serialization of a dataset descriptor.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error raised while building or writing a DataFrame.
    #[error("DataFrame error: {0}")]
    PolarsError(#[from] polars::prelude::PolarsError),

    /// A DataFrame is missing a required column.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The source image directory does not exist.
    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source directory contains no image files.
    #[error("No image files found in {}", .0.display())]
    NoImages(PathBuf),

    /// A method tag that is not one of raw, pwgcm, hsv.
    #[error("Unknown method: {0} (expected raw, pwgcm or hsv)")]
    UnknownMethod(String),

    /// Invalid confidence or IoU threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Invalid validation parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed line in a YOLO label or prediction file.
    #[error("Invalid label at {}:{line}: {reason}", .path.display())]
    InvalidLabel {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A required metric was absent from the engine result.
    #[error("Missing metric: {0}")]
    MissingMetric(String),

    /// The detection engine could not be loaded.
    #[error("Detection engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The detection engine ran but did not produce a result.
    #[error("Detection engine failed: {0}")]
    EngineFailed(String),

    /// Empty dataset provided.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Chart rendering failed.
    #[error("Chart error: {0}")]
    ChartError(String),
}

/// Render an error followed by every error in its `source()` chain.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str("\n  caused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
