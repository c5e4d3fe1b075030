//! HTTP-level tests for the prediction API.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tower::ServiceExt;

use iris_serve::classifier::RandomForest;
use iris_serve::training::train_full_dataset;
use iris_serve::{create_router, AppState, Config, InferenceService};

static MODEL: Lazy<RandomForest> = Lazy::new(|| train_full_dataset().unwrap());

fn config_with_static(dir: PathBuf) -> Config {
    Config {
        static_dir: dir,
        ..Config::default()
    }
}

fn app() -> Router {
    let config = config_with_static(PathBuf::from("does-not-exist"));
    create_router(AppState::new(InferenceService::with_model(MODEL.clone()), config))
}

fn app_without_model() -> Router {
    create_router(AppState::new(InferenceService::new(), Config::default()))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn sample(sl: f64, sw: f64, pl: f64, pw: f64) -> Value {
    json!({
        "sepal_length": sl,
        "sepal_width": sw,
        "petal_length": pl,
        "petal_width": pw,
    })
}

// =============================================================================
// Health and metadata
// =============================================================================

#[tokio::test]
async fn test_health_reports_loaded_model() {
    let (status, body) = send(app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_health_is_unavailable_without_model() {
    let (status, body) = send(app_without_model(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Model not loaded");
}

#[tokio::test]
async fn test_model_info_lists_features_and_classes() {
    let (status, body) = send(app(), "GET", "/model/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_type"], "RandomForestClassifier");
    assert_eq!(body["n_features"], 4);
    assert_eq!(body["n_classes"], 3);
    assert_eq!(body["features"][2], "petal length (cm)");
    assert_eq!(body["target_classes"], json!(["setosa", "versicolor", "virginica"]));
}

#[tokio::test]
async fn test_model_info_is_unavailable_without_model() {
    let (status, _) = send(app_without_model(), "GET", "/model/info", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Single prediction
// =============================================================================

#[tokio::test]
async fn test_predict_setosa() {
    let (status, body) = send(app(), "POST", "/predict", Some(sample(5.1, 3.5, 1.4, 0.2))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "setosa");
    assert_eq!(body["prediction_id"], 0);
    assert!(body["confidence"].as_f64().unwrap() > 0.9);

    let probabilities = body["probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 3);
    let sum: f64 = probabilities.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_predict_virginica() {
    let (status, body) = send(app(), "POST", "/predict", Some(sample(6.3, 3.3, 6.0, 2.5))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "virginica");
    assert_eq!(body["prediction_id"], 2);
}

#[tokio::test]
async fn test_predict_rejects_out_of_range_field() {
    let (status, body) = send(app(), "POST", "/predict", Some(sample(15.0, 3.5, 1.4, 0.2))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("sepal_length"));
}

#[tokio::test]
async fn test_predict_rejects_missing_field() {
    let body = json!({ "sepal_length": 5.1, "sepal_width": 3.5 });
    let (status, body) = send(app(), "POST", "/predict", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{ nope"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_without_model_is_unavailable() {
    let (status, _) = send(app_without_model(), "POST", "/predict", Some(sample(5.1, 3.5, 1.4, 0.2))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_predict_with_broken_model_is_internal_error() {
    let mut broken = MODEL.clone();
    broken.trees.clear();
    let app = create_router(AppState::new(InferenceService::with_model(broken), Config::default()));

    let (status, body) = send(app, "POST", "/predict", Some(sample(5.1, 3.5, 1.4, 0.2))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Prediction failed:"));
}

// =============================================================================
// Batch prediction
// =============================================================================

#[tokio::test]
async fn test_batch_returns_predictions_in_order() {
    let samples = json!({
        "samples": [
            sample(5.1, 3.5, 1.4, 0.2),
            sample(7.0, 3.2, 4.7, 1.4),
            sample(6.3, 3.3, 6.0, 2.5),
        ]
    });
    let (status, body) = send(app(), "POST", "/predict/batch", Some(samples)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["batch_size"], 3);
    let names: Vec<&str> = body["predictions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["prediction"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["setosa", "versicolor", "virginica"]);
}

#[tokio::test]
async fn test_batch_of_exactly_one_hundred() {
    let samples: Vec<Value> = (0..100).map(|_| sample(5.1, 3.5, 1.4, 0.2)).collect();
    let (status, body) = send(app(), "POST", "/predict/batch", Some(json!({ "samples": samples }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["batch_size"], 100);
    assert_eq!(body["predictions"].as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn test_batch_over_limit_is_rejected() {
    let samples: Vec<Value> = (0..101).map(|_| sample(5.1, 3.5, 1.4, 0.2)).collect();
    let (status, body) = send(app(), "POST", "/predict/batch", Some(json!({ "samples": samples }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Batch size cannot exceed 100 samples (got 101)");
    assert!(body.get("predictions").is_none());
}

#[tokio::test]
async fn test_batch_with_invalid_sample_is_rejected() {
    let samples = json!({
        "samples": [sample(5.1, 3.5, 1.4, 0.2), sample(5.1, 3.5, 1.4, -1.0)]
    });
    let (status, body) = send(app(), "POST", "/predict/batch", Some(samples)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "sample 1: petal_width must be between 0 and 10");
}

#[tokio::test]
async fn test_empty_batch_is_fine() {
    let (status, body) = send(app(), "POST", "/predict/batch", Some(json!({ "samples": [] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["batch_size"], 0);
}

// =============================================================================
// Landing page
// =============================================================================

#[tokio::test]
async fn test_root_describes_api_without_static_assets() {
    let (status, body) = send(app(), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Iris Classification API");
    assert!(body["endpoints"]["predict"].is_string());

    let (status, body) = send(app(), "GET", "/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["health"], "/health - Health check");
}

#[tokio::test]
async fn test_root_serves_index_html_when_present() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Iris</h1>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();

    let config = config_with_static(dir.path().to_path_buf());
    let app = create_router(AppState::new(InferenceService::with_model(MODEL.clone()), config));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>Iris</h1>");

    let response = app
        .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
