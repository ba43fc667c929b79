use crate::{
    error::ApiError,
    ingest::{DetectForm, parse_confidence},
    pipeline::run_detection,
    state::{AppState, DetectResponse, HealthResponse},
};
use axum::{
    Json,
    extract::{
        Multipart, Query, State, multipart::MultipartRejection, rejection::QueryRejection,
    },
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::time::Instant;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Default, Deserialize)]
pub struct DetectParams {
    pub confidence: Option<String>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

#[tracing::instrument(
    name = "detect_request",
    skip_all,
    fields(confidence = tracing::field::Empty, num_potholes = tracing::field::Empty)
)]
pub async fn detect(
    State(state): State<AppState>,
    params: Result<Query<DetectParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    state.metrics.record_request();
    let started = Instant::now();

    match handle_detect(&state, params, multipart).await {
        Ok(response) => {
            let elapsed = started.elapsed();
            state.metrics.record_success(elapsed, response.num_potholes);
            tracing::Span::current().record("num_potholes", response.num_potholes);
            tracing::info!(
                num_potholes = response.num_potholes,
                elapsed_ms = elapsed.as_millis() as u64,
                "Detection complete"
            );
            Json(response).into_response()
        }
        Err(err) => {
            state.metrics.record_failure(err.kind());
            if err.status().is_server_error() {
                tracing::error!(kind = err.kind(), error = %err, "Detect request failed");
            } else {
                tracing::warn!(kind = err.kind(), error = %err, "Rejected detect request");
            }
            err.into_response_with(state.expose_error_detail)
        }
    }
}

async fn handle_detect(
    state: &AppState,
    params: Result<Query<DetectParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<DetectResponse, ApiError> {
    let Query(params) = params?;
    let form = DetectForm::read(multipart?).await?;

    // Form field wins over the query string
    let confidence = match form.confidence.as_deref().or(params.confidence.as_deref()) {
        Some(raw) => parse_confidence(raw)?,
        None => state.default_confidence,
    };
    tracing::Span::current().record("confidence", confidence);

    let upload = form
        .file
        .ok_or_else(|| ApiError::InvalidInput("Missing `file` field".to_string()))?;
    upload.validate()?;

    tracing::debug!(
        file_name = upload.file_name.as_deref().unwrap_or(""),
        content_type = upload.content_type.as_deref().unwrap_or(""),
        bytes = upload.bytes.len(),
        "Upload received"
    );

    let detector = state.detector.clone();
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        run_detection(detector.as_ref(), &upload, confidence)
    })
    .await?
}
