//! Inference Service - validated predictions against the loaded forest
//!
//! The model slot is a `OnceCell`: it is either empty or holds a fully
//! built model, published once and read-only afterwards. Request handlers
//! share the service through an `Arc` without locking.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use validator::Validate;

use crate::classifier::forest::argmax;
use crate::data::CLASS_NAMES;
use crate::models::{ModelInfo, Prediction, Sample};
use crate::training::{load_model, save_model, train_full_dataset, TrainedModel};

use super::{BootstrapError, ServiceError, ValidationError};

/// Largest accepted batch
pub const MAX_BATCH_SIZE: usize = 100;

/// Where to look for a model artifact, and where to write a fresh one
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Tried in order; the first readable, valid artifact wins
    pub candidates: Vec<PathBuf>,
    pub output_path: PathBuf,
}

#[derive(Debug, Default)]
pub struct InferenceService {
    model: OnceCell<Arc<TrainedModel>>,
}

impl InferenceService {
    /// Service with no model; `health()` is false until [`install`](Self::install)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: impl Into<TrainedModel>) -> Self {
        Self {
            model: OnceCell::with_value(Arc::new(model.into())),
        }
    }

    /// Publish the model. Fails if one is already installed.
    pub fn install(&self, model: impl Into<TrainedModel>) -> Result<(), ServiceError> {
        self.model
            .set(Arc::new(model.into()))
            .map_err(|_| ServiceError::AlreadyLoaded)
    }

    /// Load the first usable artifact from `source`, or train and save a new one.
    pub fn bootstrap(source: &ModelSource) -> Result<Self, BootstrapError> {
        for path in &source.candidates {
            if !path.exists() {
                tracing::debug!("No model at {}", path.display());
                continue;
            }
            match load_model(path) {
                Ok(model) => {
                    tracing::info!(
                        normalized = model.is_normalized(),
                        "Model loaded successfully from {}",
                        path.display()
                    );
                    return Ok(Self::with_model(model));
                }
                Err(e) => tracing::warn!("Failed to load model from {}: {}", path.display(), e),
            }
        }

        tracing::warn!("No pre-trained model found. Training new model...");
        let model = TrainedModel::from(train_full_dataset().map_err(|e| {
            tracing::error!("Failed to train new model: {}", e);
            BootstrapError::Training(e)
        })?);

        if let Err(e) = save_model(&model, &source.output_path) {
            tracing::warn!("Trained model could not be saved, serving it from memory: {}", e);
        }

        tracing::info!("New model trained and loaded successfully");
        Ok(Self::with_model(model))
    }

    /// True once a model is installed
    pub fn health(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn model(&self) -> Result<&TrainedModel, ServiceError> {
        self.model
            .get()
            .map(|m| m.as_ref())
            .ok_or(ServiceError::Unavailable)
    }

    pub fn model_info(&self) -> Result<ModelInfo, ServiceError> {
        self.model()?;
        Ok(ModelInfo::current())
    }

    pub fn predict(&self, sample: &Sample) -> Result<Prediction, ServiceError> {
        validate_sample(sample, None)?;
        let model = self.model()?;
        infer(model, sample)
    }

    /// Predict every sample, in input order.
    ///
    /// The size limit and every sample are checked before any inference, so a
    /// rejected batch produces no predictions at all.
    pub fn predict_batch(&self, samples: &[Sample]) -> Result<Vec<Prediction>, ServiceError> {
        if samples.len() > MAX_BATCH_SIZE {
            return Err(ValidationError::BatchTooLarge {
                size: samples.len(),
                max: MAX_BATCH_SIZE,
            }
            .into());
        }
        for (idx, sample) in samples.iter().enumerate() {
            validate_sample(sample, Some(idx))?;
        }

        let model = self.model()?;
        samples.iter().map(|sample| infer(model, sample)).collect()
    }
}

fn validate_sample(sample: &Sample, index: Option<usize>) -> Result<(), ValidationError> {
    let mut fields: Vec<String> = match sample.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.field_errors().keys().map(|f| f.to_string()).collect(),
    };
    // Range checks let NaN through
    for (name, value) in Sample::FIELDS.iter().zip(sample.to_array()) {
        if value.is_nan() && !fields.iter().any(|f| f == name) {
            fields.push(name.to_string());
        }
    }

    if fields.is_empty() {
        return Ok(());
    }
    fields.sort_by_key(|f| Sample::FIELDS.iter().position(|name| name == f));
    Err(ValidationError::OutOfRange { index, fields })
}

fn infer(model: &TrainedModel, sample: &Sample) -> Result<Prediction, ServiceError> {
    let proba = model
        .predict_proba(&sample.to_array())
        .map_err(|e| ServiceError::Inference(e.to_string()))?;

    let prediction_id = argmax(&proba);
    let name = CLASS_NAMES
        .get(prediction_id)
        .ok_or_else(|| ServiceError::Inference(format!("class index {prediction_id} has no name")))?;
    let confidence = proba.iter().copied().fold(0.0, f64::max);

    let probabilities: BTreeMap<String, f64> = CLASS_NAMES
        .iter()
        .zip(&proba)
        .map(|(name, p)| (name.to_string(), *p))
        .collect();

    Ok(Prediction {
        prediction: name.to_string(),
        prediction_id,
        confidence,
        probabilities,
    })
}
