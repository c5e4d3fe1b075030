//! Descriptive statistics for diagnostics

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStats {
    pub mean: Vec<f64>,
    /// Population standard deviation
    pub std: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub n_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
    pub class_distribution: BTreeMap<usize, usize>,
    pub feature_stats: FeatureStats,
}

/// Summarize a feature matrix and its labels
pub fn summarize<R: AsRef<[f64]>>(features: &[R], target: &[usize]) -> DataSummary {
    let n_samples = features.len();
    let n_features = features.first().map_or(0, |row| row.as_ref().len());

    let mut class_distribution = BTreeMap::new();
    for &label in target {
        *class_distribution.entry(label).or_insert(0) += 1;
    }

    let mut mean = vec![0.0; n_features];
    let mut std = vec![0.0; n_features];
    if n_samples > 0 {
        let n = n_samples as f64;
        for row in features {
            for (m, v) in mean.iter_mut().zip(row.as_ref()) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        for row in features {
            for (j, v) in row.as_ref().iter().enumerate().take(n_features) {
                let d = v - mean[j];
                std[j] += d * d;
            }
        }
        std.iter_mut().for_each(|s| *s = (*s / n).sqrt());
    }

    DataSummary {
        n_samples,
        n_features,
        n_classes: class_distribution.len(),
        class_distribution,
        feature_stats: FeatureStats { mean, std },
    }
}
