//! Detection engines: the collaborators that turn a dataset descriptor into
//! detection metrics.
//!
//! [`UltralyticsEngine`] is the default and runs the external library.
//! [`OfflineEngine`] is an alternative that scores stored prediction files.

use std::path::Path;

use crate::config::ValidationParams;
use crate::error::Result;
use crate::types::{DetectionMetrics, Method};

pub mod offline;
pub mod ultralytics;

pub use offline::OfflineEngine;
pub use ultralytics::UltralyticsEngine;

/// Everything an engine needs for one validation run.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    pub method: Method,
    /// Path of the dataset descriptor YAML.
    pub descriptor: &'a Path,
    pub params: &'a ValidationParams,
    /// Directory the engine may write its own artefacts into.
    pub run_dir: &'a Path,
}

/// A detector validation backend.
pub trait DetectionEngine {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Validate the detector on the dataset described by `request`.
    fn validate(&mut self, request: &ValidationRequest<'_>) -> Result<DetectionMetrics>;
}

impl<E: DetectionEngine + ?Sized> DetectionEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn validate(&mut self, request: &ValidationRequest<'_>) -> Result<DetectionMetrics> {
        (**self).validate(request)
    }
}
