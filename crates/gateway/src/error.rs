use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inference::DetectorError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Detection failed: {0}")]
    Detection(#[from] DetectorError),

    #[error("Failed to encode result image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Detection task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(err) => err.status(),
            ApiError::Decode(_)
            | ApiError::Detection(_)
            | ApiError::Encode(_)
            | ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metric attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::Multipart(_) => "multipart",
            ApiError::Decode(_) => "decode",
            ApiError::Detection(_) => "detection",
            ApiError::Encode(_) => "encode",
            ApiError::Join(_) => "join",
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::InvalidInput(message) => message.clone(),
            ApiError::Multipart(err) => format!("Invalid multipart body: {}", err.body_text()),
            ApiError::Decode(_) => "Failed to decode image".to_string(),
            ApiError::Detection(_) => "Detection failed".to_string(),
            ApiError::Encode(_) => "Failed to encode result image".to_string(),
            ApiError::Join(_) => "Detection task failed".to_string(),
        }
    }

    /// Render as `{"detail": ...}`. Server-side failures only carry the
    /// underlying error text when `expose_detail` is set.
    pub fn into_response_with(self, expose_detail: bool) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() && expose_detail {
            self.to_string()
        } else {
            self.public_message()
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}
