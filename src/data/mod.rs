//! Data Module - fixed Iris dataset and preprocessing
//!
//! Loading, optional standardization, stratified train/test split and
//! descriptive statistics. Everything here is in-memory and deterministic.

pub mod iris;
pub mod loader;
pub mod split;
pub mod summary;

#[cfg(test)]
mod tests;

pub use loader::{load_dataset, prepare_data_pipeline, Dataset, PreparedData, Scaler};
pub use split::{split_dataset, Split};
pub use summary::{summarize, DataSummary, FeatureStats};

use thiserror::Error;

/// Number of measurements per sample
pub const N_FEATURES: usize = 4;

/// Number of species
pub const N_CLASSES: usize = 3;

/// Feature names, in column order
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "sepal length (cm)",
    "sepal width (cm)",
    "petal length (cm)",
    "petal width (cm)",
];

/// Species names, indexed by class label
pub const CLASS_NAMES: [&str; N_CLASSES] = ["setosa", "versicolor", "virginica"];

/// Default held-out fraction
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default shuffle seed
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("test fraction must be in (0, 1), got {0}")]
    InvalidTestFraction(f64),

    #[error("features and target differ in length ({features} vs {target})")]
    LengthMismatch { features: usize, target: usize },

    #[error("cannot split an empty dataset")]
    Empty,

    #[error("split of {n_samples} rows with test fraction {test_fraction} leaves a partition empty")]
    DegenerateSplit { n_samples: usize, test_fraction: f64 },
}
