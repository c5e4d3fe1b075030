//! Iris Classification API server
//!
//! Loads (or trains) the classifier once, then serves predictions.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iris_serve::{create_router, AppState, Config, InferenceService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "iris_serve=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Iris Classification API starting...");
    tracing::info!("Environment: {}", config.environment);

    // Model loading blocks; keep it off the async workers and finish before serving
    let source = config.model_source();
    let service = tokio::task::spawn_blocking(move || InferenceService::bootstrap(&source))
        .await
        .context("model bootstrap task panicked")?
        .context("Could not load or train model")?;

    let state = AppState::new(service, config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
