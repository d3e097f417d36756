use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use super::models::{ErrorResponse, StatusResponse};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No image provided.")]
    MissingImage,

    #[error("Invalid image data.")]
    InvalidImage,

    /// Body exceeded the configured limit; carries the rejection text
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The recognizer is still loading; the client should retry
    #[error("{message}")]
    NotReady { message: String },

    #[error("OCR model failed to load: {0}")]
    LoadFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingImage | ApiError::InvalidImage => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(self.to_string()))).into_response()
            }
            ApiError::PayloadTooLarge(message) => {
                (StatusCode::PAYLOAD_TOO_LARGE, Json(ErrorResponse::new(message))).into_response()
            }
            ApiError::NotReady { message } => (
                StatusCode::ACCEPTED,
                Json(StatusResponse::new("loading", message)),
            )
                .into_response(),
            ApiError::LoadFailed(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse::new("failed", self.to_string())),
            )
                .into_response(),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Detection request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(message))).into_response()
            }
        }
    }
}
