//! HTTP routes and handlers

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pillsquad_core::{
    CompanyPrediction, CompanyRequest, Error, ErrorBody, ImageVerdict, IngredientPrediction,
    IngredientRequest,
};
use serde_json::json;
use std::time::Instant;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, warn};

use crate::state::AppState;

/// Message returned when the company endpoint has nothing to classify
pub const EMPTY_COMPANY_MESSAGE: &str = "하나 이상의 정보를 입력하세요.";

pub fn create_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .route("/predict-company", post(predict_company))
        .route("/classify-image", post(classify_image))
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Ingredient / company-name risk prediction
async fn predict(
    State(state): State<AppState>,
    Json(req): Json<IngredientRequest>,
) -> Result<Response, AppError> {
    metrics::counter!("pillsquad_requests_total", "endpoint" => "predict").increment(1);

    let clf = state
        .classifiers
        .ingredient
        .clone()
        .ok_or(AppError::ModelUnavailable("ingredient"))?;

    let outcome = run_inference("ingredient", move || {
        clf.classify_request(req.ingredients.as_deref(), req.company_name.as_deref())
    })
    .await;

    match outcome {
        Ok(result) => {
            debug!(label = %result.label, score = result.score, "ingredient prediction");
            Ok(Json(IngredientPrediction {
                input: result.input.unwrap_or_default(),
                prediction: result.label,
                confidence: round4(result.score),
            })
            .into_response())
        }
        // Invalid input is answered in-band with 200, as clients expect
        Err(Error::InvalidInput(message)) => Ok(Json(ErrorBody::new(message)).into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Company-origin prediction from company name, representative and address
async fn predict_company(
    State(state): State<AppState>,
    Json(req): Json<CompanyRequest>,
) -> Result<Response, AppError> {
    metrics::counter!("pillsquad_requests_total", "endpoint" => "predict-company").increment(1);

    let clf = state
        .classifiers
        .company
        .clone()
        .ok_or(AppError::ModelUnavailable("company"))?;

    let result = run_inference("company", move || clf.classify_request(&req)).await?;

    Ok(match result {
        Some(result) => {
            debug!(label = %result.label, probability = result.score, "company prediction");
            Json(CompanyPrediction {
                label: result.label,
                probability: f64::from(result.score),
            })
            .into_response()
        }
        None => Json(ErrorBody::new(EMPTY_COMPANY_MESSAGE)).into_response(),
    })
}

/// Product-image classification from a multipart `file` upload
async fn classify_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImageVerdict>, AppError> {
    metrics::counter!("pillsquad_requests_total", "endpoint" => "classify-image").increment(1);

    let clf = state
        .classifiers
        .image
        .clone()
        .ok_or(AppError::ModelUnavailable("image"))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let bytes =
        upload.ok_or_else(|| AppError::BadRequest("missing multipart field `file`".to_string()))?;
    debug!(size = bytes.len(), "image upload received");

    let result = run_inference("image", move || clf.classify_bytes(&bytes)).await?;
    Ok(Json(ImageVerdict {
        result: result.label,
    }))
}

async fn fallback() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

/// Run CPU-bound inference off the async workers and record its latency
async fn run_inference<T, F>(model: &'static str, f: F) -> pillsquad_core::Result<T>
where
    F: FnOnce() -> pillsquad_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("inference task failed: {e}")))?;

    metrics::histogram!("pillsquad_inference_latency_us", "model" => model)
        .record(start.elapsed().as_micros() as f64);
    result
}

fn round4(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    UnprocessableImage(String),
    ModelUnavailable(&'static str),
    /// Upload rejected while streaming, with the status the extractor chose
    Rejected(StatusCode, String),
    Internal(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => AppError::BadRequest(msg),
            Error::InvalidImage(msg) => AppError::UnprocessableImage(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Rejected(err.status(), err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::UnprocessableImage(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_image", msg)
            }
            AppError::ModelUnavailable(model) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "model_unavailable",
                format!("{model} model is not configured"),
            ),
            AppError::Rejected(status, msg) => (status, "rejected", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }
        metrics::counter!("pillsquad_errors_total", "kind" => kind).increment(1);

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4_is_exact_in_f64() {
        assert_eq!(round4(0.7), 0.7);
        assert_eq!(round4(0.123_456), 0.1235);
    }

    #[test]
    fn test_error_mapping() {
        let response = AppError::from(Error::invalid_image("bad bytes")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::from(Error::data_load("gone")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::ModelUnavailable("image").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
