//! Model and API description

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{CLASS_NAMES, FEATURE_NAMES, N_CLASSES, N_FEATURES};
use crate::training::MODEL_TYPE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub features: Vec<String>,
    pub target_classes: Vec<String>,
    pub n_features: usize,
    pub n_classes: usize,
}

impl ModelInfo {
    /// Static description of the served classifier
    pub fn current() -> Self {
        Self {
            model_type: MODEL_TYPE.to_string(),
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            target_classes: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            n_features: N_FEATURES,
            n_classes: N_CLASSES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDescription {
    pub message: String,
    pub version: String,
    pub description: String,
    pub endpoints: BTreeMap<String, String>,
}

impl ApiDescription {
    pub fn current() -> Self {
        let endpoints = [
            ("predict", "/predict - Single prediction"),
            ("predict_batch", "/predict/batch - Batch predictions"),
            ("health", "/health - Health check"),
            ("model_info", "/model/info - Model metadata"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            message: "Iris Classification API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Classify iris flowers using a random forest".to_string(),
            endpoints,
        }
    }
}
