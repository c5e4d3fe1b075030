//! Dataset loading and standardization

use serde::{Deserialize, Serialize};

use super::iris::{IRIS_FEATURES, IRIS_TARGET};
use super::split::split_dataset;
use super::summary::{summarize, DataSummary};
use super::{DataError, CLASS_NAMES, FEATURE_NAMES, N_FEATURES};

/// Feature matrix with labels and metadata
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub features: Vec<[f64; N_FEATURES]>,
    pub target: Vec<usize>,
    pub feature_names: Vec<&'static str>,
    pub target_names: Vec<&'static str>,
    pub normalized: bool,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Per-feature standardization statistics (zero mean, unit variance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: [f64; N_FEATURES],
    /// Population standard deviation; zero deviations are stored as 1.
    pub std: [f64; N_FEATURES],
}

impl Scaler {
    pub fn fit(rows: &[[f64; N_FEATURES]]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut mean = [0.0; N_FEATURES];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut std = [0.0; N_FEATURES];
        for row in rows {
            for j in 0..N_FEATURES {
                let d = row[j] - mean[j];
                std[j] += d * d;
            }
        }
        for s in std.iter_mut() {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Self { mean, std }
    }

    pub fn transform(&self, row: &[f64; N_FEATURES]) -> [f64; N_FEATURES] {
        let mut out = [0.0; N_FEATURES];
        for j in 0..N_FEATURES {
            out[j] = (row[j] - self.mean[j]) / self.std[j];
        }
        out
    }
}

/// Load the Iris table, optionally standardized.
///
/// The scaler is fitted on all rows before any split, so a later train/test
/// split shares statistics across partitions. This matches the historical
/// pipeline and is kept as-is.
pub fn load_dataset(normalize: bool) -> (Dataset, Option<Scaler>) {
    tracing::info!("Loading Iris dataset...");

    let mut features = IRIS_FEATURES.to_vec();
    let scaler = if normalize {
        tracing::info!("Normalizing features...");
        let scaler = Scaler::fit(&features);
        for row in features.iter_mut() {
            *row = scaler.transform(row);
        }
        Some(scaler)
    } else {
        None
    };

    let dataset = Dataset {
        features,
        target: IRIS_TARGET.to_vec(),
        feature_names: FEATURE_NAMES.to_vec(),
        target_names: CLASS_NAMES.to_vec(),
        normalized: normalize,
    };

    tracing::info!(
        "Dataset loaded: {} samples, {} features",
        dataset.len(),
        N_FEATURES
    );

    (dataset, scaler)
}

/// Train/test partitions with their summaries
#[derive(Debug, Clone, Serialize)]
pub struct PreparedData {
    pub x_train: Vec<[f64; N_FEATURES]>,
    pub x_test: Vec<[f64; N_FEATURES]>,
    pub y_train: Vec<usize>,
    pub y_test: Vec<usize>,
    pub feature_names: Vec<&'static str>,
    pub target_names: Vec<&'static str>,
    pub train_summary: DataSummary,
    pub test_summary: DataSummary,
    pub normalized: bool,
    /// Fitted on the full table when `normalized`
    pub scaler: Option<Scaler>,
}

/// Load, split and summarize in one step
pub fn prepare_data_pipeline(
    normalize: bool,
    test_fraction: f64,
    seed: u64,
) -> Result<PreparedData, DataError> {
    let (dataset, scaler) = load_dataset(normalize);
    let split = split_dataset(&dataset.features, &dataset.target, test_fraction, seed)?;

    let train_summary = summarize(&split.x_train, &split.y_train);
    let test_summary = summarize(&split.x_test, &split.y_test);

    Ok(PreparedData {
        x_train: split.x_train,
        x_test: split.x_test,
        y_train: split.y_train,
        y_test: split.y_test,
        feature_names: dataset.feature_names,
        target_names: dataset.target_names,
        train_summary,
        test_summary,
        normalized: normalize,
        scaler,
    })
}
