//! Inference Module - request-time prediction

pub mod service;


pub use service::{InferenceService, ModelSource, MAX_BATCH_SIZE};

use thiserror::Error;

use crate::training::TrainingError;

/// Rejected input; nothing was run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{}", out_of_range_message(.index, .fields))]
    OutOfRange {
        /// Position within a batch
        index: Option<usize>,
        fields: Vec<String>,
    },

    #[error("Batch size cannot exceed {max} samples (got {size})")]
    BatchTooLarge { size: usize, max: usize },
}

fn out_of_range_message(index: &Option<usize>, fields: &[String]) -> String {
    let prefix = index.map(|i| format!("sample {i}: ")).unwrap_or_default();
    format!("{prefix}{} must be between 0 and 10", fields.join(", "))
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Model not loaded")]
    Unavailable,

    #[error("{0}")]
    Inference(String),

    #[error("Model already loaded")]
    AlreadyLoaded,
}

/// Startup could neither load nor train a model
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("could not load or train model: {0}")]
    Training(#[source] TrainingError),
}
