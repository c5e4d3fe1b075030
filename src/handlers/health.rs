//! Health check handler

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    version: &'static str,
    timestamp: String,
}

/// 200 once a model is loaded, 503 before
pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    if !state.service.health() {
        return Err(AppError::ModelNotLoaded);
    }

    Ok(Json(HealthResponse {
        status: "healthy",
        model_loaded: true,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}
