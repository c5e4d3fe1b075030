//! Landing page and API description

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::models::ApiDescription;
use crate::AppState;

/// Serve `index.html` from the static directory, or describe the API
pub async fn index(State(state): State<AppState>) -> Response {
    let page = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&page).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => Json(ApiDescription::current()).into_response(),
    }
}

pub async fn api_info() -> Json<ApiDescription> {
    Json(ApiDescription::current())
}
