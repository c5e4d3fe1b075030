//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::models::{BatchPredictionRequest, BatchPredictionResponse, Prediction, Sample};
use crate::{AppError, AppResult, AppState};

/// Classify one sample
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Sample>, JsonRejection>,
) -> AppResult<Json<Prediction>> {
    let Json(sample) = payload?;

    let prediction = state
        .service
        .predict(&sample)
        .map_err(AppError::from_predict)?;

    tracing::debug!(
        prediction = %prediction.prediction,
        confidence = prediction.confidence,
        "Prediction served"
    );
    Ok(Json(prediction))
}

/// Classify up to 100 samples, all-or-nothing
pub async fn predict_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchPredictionRequest>, JsonRejection>,
) -> AppResult<Json<BatchPredictionResponse>> {
    let Json(batch) = payload?;

    let predictions = state
        .service
        .predict_batch(&batch.samples)
        .map_err(AppError::from_batch)?;

    tracing::debug!("Batch of {} predictions served", predictions.len());
    Ok(Json(BatchPredictionResponse {
        batch_size: predictions.len(),
        predictions,
    }))
}
