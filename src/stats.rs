//! Summary statistics across the rows of a comparison table
//!
//! One [`MetricStatistics`] is produced per persisted metric name, in the
//! same order as [`METRIC_NAMES`].

use serde::{Deserialize, Serialize};

use crate::types::{MetricVector, METRIC_NAMES};

/// Spread of one metric across several evaluations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStatistics {
    /// Statistics of a non-empty slice; `None` when `values` is empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Per-metric statistics for a set of metric vectors
///
/// Returns an empty list for empty input.
pub fn calculate_statistics(vectors: &[MetricVector]) -> Vec<(&'static str, MetricStatistics)> {
    METRIC_NAMES
        .iter()
        .filter_map(|&name| {
            let values: Vec<f64> = vectors.iter().filter_map(|v| v.get(name)).collect();
            MetricStatistics::from_values(&values).map(|stats| (name, stats))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(calculate_statistics(&[]).is_empty());
        assert_eq!(MetricStatistics::from_values(&[]), None);
    }

    #[test]
    fn test_population_std() {
        let stats = MetricStatistics::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_statistics_per_metric() {
        let vectors = vec![
            MetricVector::new(0.6, 0.5, 0.4, 0.8, 0.6),
            MetricVector::new(0.4, 0.3, 0.2, 0.6, 0.4),
        ];
        let stats = calculate_statistics(&vectors);
        assert_eq!(stats.len(), 6);
        assert_eq!(stats[1].0, "mAP@0.5:0.95");
        assert!((stats[1].1.mean - 0.4).abs() < 1e-12);
        assert!((stats[1].1.std - 0.1).abs() < 1e-12);
        assert_eq!(stats[5].0, "f1_score");
    }

    #[test]
    fn test_single_value_has_zero_spread() {
        let stats = calculate_statistics(&[MetricVector::new(0.5, 0.3, 0.2, 0.1, 0.1)]);
        assert!(stats.iter().all(|(_, s)| s.std == 0.0 && s.min == s.max));
    }
}
