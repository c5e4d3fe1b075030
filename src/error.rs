//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::inference::{ServiceError, ValidationError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    BadRequest(String),
    ValidationError(String),

    // Model errors
    ModelNotLoaded,
    InferenceError(String),

    // Generic errors
    InternalError(String),
}

impl AppError {
    /// Map a service error from the single-sample endpoint
    pub fn from_predict(err: ServiceError) -> Self {
        Self::from_service(err, "Prediction failed")
    }

    /// Map a service error from the batch endpoint
    pub fn from_batch(err: ServiceError) -> Self {
        Self::from_service(err, "Batch prediction failed")
    }

    fn from_service(err: ServiceError, context: &str) -> Self {
        match err {
            ServiceError::Validation(e @ ValidationError::BatchTooLarge { .. }) => {
                AppError::BadRequest(e.to_string())
            }
            ServiceError::Validation(e) => AppError::ValidationError(e.to_string()),
            ServiceError::Unavailable => AppError::ModelNotLoaded,
            ServiceError::Inference(msg) => AppError::InferenceError(format!("{context}: {msg}")),
            other @ ServiceError::AlreadyLoaded => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::from_predict(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => AppError::ValidationError(rejection.body_text()),
            _ => AppError::BadRequest(rejection.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::ModelNotLoaded => (StatusCode::SERVICE_UNAVAILABLE, "Model not loaded"),
            AppError::InferenceError(msg) => {
                tracing::error!("{}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "detail": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
