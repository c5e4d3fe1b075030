//! Training Module - fit, evaluate and persist the classifier
//!
//! Offline only. The inference service calls into this module once at
//! startup when no usable artifact exists.

pub mod evaluate;
pub mod persist;
pub mod pipeline;


pub use evaluate::{evaluate, AverageReport, ClassReport, EvaluationReport};
pub use persist::{load_model, save_model, ModelArtifact, PersistenceError, TrainedModel, MODEL_TYPE};
pub use pipeline::{
    run_training, train, train_full_dataset, train_with, TrainingOptions, TrainingOutcome,
    DEFAULT_MODEL_PATH,
};

use thiserror::Error;

use crate::classifier::{FitError, ModelError};
use crate::data::DataError;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("data preparation failed: {0}")]
    Data(#[from] DataError),

    #[error("training failed: {0}")]
    Fit(#[from] FitError),

    #[error("prediction failed during evaluation: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("features and target differ in length ({features} vs {target})")]
    LengthMismatch { features: usize, target: usize },

    #[error("cannot evaluate on an empty set")]
    EmptyEvaluation,

    #[error("label {0} is not a known class")]
    UnknownLabel(usize),
}
