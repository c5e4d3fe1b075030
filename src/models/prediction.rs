//! Prediction model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One flower's measurements, in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Sample {
    #[validate(range(min = 0.0, max = 10.0))]
    pub sepal_length: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub sepal_width: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub petal_length: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub petal_width: f64,
}

impl Sample {
    /// Field names in model column order
    pub const FIELDS: [&'static str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    /// Model input layout
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionRequest {
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Species name
    pub prediction: String,
    pub prediction_id: usize,
    /// Highest class probability
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<Prediction>,
    pub batch_size: usize,
}
