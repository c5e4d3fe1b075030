//! End-to-end training pipeline: load, split, fit, evaluate, persist

use std::path::PathBuf;

use serde::Serialize;

use crate::classifier::{ForestParams, RandomForest};
use crate::data::{self, DataSummary, DEFAULT_SEED, DEFAULT_TEST_FRACTION, N_CLASSES};

use super::evaluate::{evaluate, EvaluationReport};
use super::persist::{save_model, TrainedModel};
use super::TrainingError;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/iris_model.json";

/// Fit a forest with the default hyperparameters
pub fn train<R: AsRef<[f64]>>(features: &[R], target: &[usize]) -> Result<RandomForest, TrainingError> {
    train_with(features, target, &ForestParams::default())
}

pub fn train_with<R: AsRef<[f64]>>(
    features: &[R],
    target: &[usize],
    params: &ForestParams,
) -> Result<RandomForest, TrainingError> {
    tracing::info!("Training model on {} samples...", features.len());
    let model = RandomForest::fit(features, target, N_CLASSES, params)?;
    tracing::info!("Model trained ({} trees)", model.trees.len());
    Ok(model)
}

/// Fit on all 150 raw rows. Used when no artifact can be loaded.
pub fn train_full_dataset() -> Result<RandomForest, TrainingError> {
    let (dataset, _) = data::load_dataset(false);
    train(&dataset.features, &dataset.target)
}

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub output_path: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
    pub normalize: bool,
    pub params: ForestParams,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_MODEL_PATH),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            normalize: false,
            params: ForestParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingOutcome {
    pub accuracy: f64,
    pub report: EvaluationReport,
    pub train_summary: DataSummary,
    pub test_summary: DataSummary,
    pub normalized: bool,
    pub model_path: PathBuf,
}

/// Run the offline pipeline and persist the fitted model.
///
/// With `normalize`, the artifact carries the scaler so the served model can
/// take raw measurements.
pub fn run_training(options: &TrainingOptions) -> Result<(TrainedModel, TrainingOutcome), TrainingError> {
    let prepared = data::prepare_data_pipeline(options.normalize, options.test_fraction, options.seed)?;

    let forest = train_with(&prepared.x_train, &prepared.y_train, &options.params)?;
    let report = evaluate(&forest, &prepared.x_test, &prepared.y_test)?;
    tracing::info!("Test accuracy: {:.4}", report.accuracy);

    let model = TrainedModel::new(forest, prepared.scaler);
    save_model(&model, &options.output_path)?;

    let outcome = TrainingOutcome {
        accuracy: report.accuracy,
        report,
        train_summary: prepared.train_summary,
        test_summary: prepared.test_summary,
        normalized: model.is_normalized(),
        model_path: options.output_path.clone(),
    };
    Ok((model, outcome))
}
