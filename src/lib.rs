//! Iris Classification Service
//!
//! Random-forest classifier over the Iris dataset, served over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        IRIS SERVE                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  offline (iris-train)            online (iris-serve)         │
//! │  ┌───────────┐  ┌───────────┐    ┌───────────┐  ┌─────────┐  │
//! │  │  data     │─▶│ training  │    │ inference │◀─│ handlers│  │
//! │  │  (split)  │  │ (forest)  │    │ (service) │  │ (Axum)  │  │
//! │  └───────────┘  └─────┬─────┘    └─────▲─────┘  └─────────┘  │
//! │                       ▼                │                     │
//! │                ┌─────────────────────────────┐               │
//! │                │   models/iris_model.json    │               │
//! │                └─────────────────────────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod models;
pub mod training;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use inference::InferenceService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: InferenceService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(handlers::root::index))
        .route("/api", get(handlers::root::api_info))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::predict_batch))
        .route("/model/info", get(handlers::model::info))
        .nest_service("/static", static_files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
