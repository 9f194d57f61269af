//! Batch evaluation: run every method through an engine, persist the
//! results and fold them into a comparison table.

use std::fs;
use std::path::PathBuf;

use crate::comparison::{create_comparison_table, ComparisonTable};
use crate::config::HarnessConfig;
use crate::descriptor::DescriptorEmitter;
use crate::engine::{DetectionEngine, ValidationRequest};
use crate::error::{error_chain, Result};
use crate::extract::extract_metrics;
use crate::persist::{save_metrics, save_metrics_summary, METRICS_FILE, SUMMARY_FILE};
use crate::polars_utils::write_comparison_csv;
use crate::report::print_comparison;
use crate::types::{Method, MethodResult, MetricVector};

/// File name of the CSV export under the output root.
pub const COMPARISON_FILE: &str = "comparison.csv";

/// Outcome of [`EvaluationDriver::evaluate_all`].
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Per-method result in evaluation order; `None` marks a failed method.
    pub results: Vec<(Method, Option<MetricVector>)>,
    pub table: ComparisonTable,
    /// Path of the CSV export, when the table was non-empty.
    pub csv: Option<PathBuf>,
}

impl BatchOutcome {
    pub fn failed(&self) -> Vec<Method> {
        self.results
            .iter()
            .filter(|(_, metrics)| metrics.is_none())
            .map(|(method, _)| *method)
            .collect()
    }
}

/// Drives one engine over the configured methods.
pub struct EvaluationDriver<E> {
    engine: E,
    config: HarnessConfig,
    emitter: DescriptorEmitter,
}

impl<E: DetectionEngine> EvaluationDriver<E> {
    pub fn new(engine: E, config: HarnessConfig) -> Self {
        let emitter = DescriptorEmitter::new(&config.config_dir, &config.data_root);
        Self {
            engine,
            config,
            emitter,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Evaluate one method. Any failure is logged with its cause chain and
    /// yields `None`; nothing is persisted for a failed method.
    pub fn evaluate(&mut self, method: Method) -> Option<MetricVector> {
        println!("\n{}", "=".repeat(60));
        println!("Evaluating: {}", method.as_str().to_uppercase());
        println!("{}", "=".repeat(60));

        match self.try_evaluate(method) {
            Ok(metrics) => Some(metrics),
            Err(err) => {
                log::error!("evaluation of {method} failed: {}", error_chain(&err));
                None
            }
        }
    }

    fn try_evaluate(&mut self, method: Method) -> Result<MetricVector> {
        let descriptor = self.emitter.emit(method)?;
        let output_dir = self.config.method_output_dir(method);
        fs::create_dir_all(&output_dir)?;

        let params = &self.config.params;
        log::info!(
            "running {} validation: descriptor={} batch={} imgsz={} conf={} iou={} device={}",
            self.engine.name(),
            descriptor.display(),
            params.batch_size,
            params.image_size,
            params.confidence,
            params.iou,
            params.device_label()
        );

        let request = ValidationRequest {
            method,
            descriptor: &descriptor,
            params,
            run_dir: &output_dir,
        };
        let raw = self.engine.validate(&request)?;
        let metrics = extract_metrics(&raw);

        println!("{}", "-".repeat(60));
        for (name, value) in metrics.entries() {
            println!("  {name:20}: {value:.4}");
        }
        println!("{}", "-".repeat(60));

        let result = MethodResult {
            model: self.config.model_name(),
            method,
            metrics,
        };
        save_metrics(&result, &output_dir.join(METRICS_FILE))?;
        save_metrics_summary(&result, &output_dir.join(SUMMARY_FILE))?;
        log::info!("{method} done; results in {}", output_dir.display());

        Ok(metrics)
    }

    /// Evaluate every configured method in order, then aggregate, print and
    /// export the comparison table.
    ///
    /// Per-method failures never abort the batch. Only a failure to write
    /// the CSV export is returned as an error.
    pub fn evaluate_all(&mut self) -> Result<BatchOutcome> {
        let methods = self.config.methods.clone();
        let names: Vec<&str> = methods.iter().map(Method::as_str).collect();
        log::info!(
            "batch evaluation of [{}] with model {} ({} engine)",
            names.join(", "),
            self.config.model,
            self.engine.name()
        );

        let results: Vec<(Method, Option<MetricVector>)> = methods
            .iter()
            .map(|&method| (method, self.evaluate(method)))
            .collect();

        let table = create_comparison_table(&self.config.output_root);
        print_comparison(&table);

        let csv = if table.is_empty() {
            None
        } else {
            let path = self.config.output_root.join(COMPARISON_FILE);
            write_comparison_csv(&table, &path)?;
            log::info!("comparison table saved to {}", path.display());
            Some(path)
        };

        let outcome = BatchOutcome { results, table, csv };
        let failed = outcome.failed();
        if !failed.is_empty() {
            let failed: Vec<&str> = failed.iter().map(Method::as_str).collect();
            log::warn!("methods without results: {}", failed.join(", "));
        }
        Ok(outcome)
    }
}
