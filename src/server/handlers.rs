use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use super::AppState;
use super::error::ApiError;
use super::models::{DetectRequest, HealthResponse, StatusResponse, decode_image};
use crate::models::DetectionRecord;
use crate::readiness::{NotReady, ReadinessState, TriggerOutcome};

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Start loading the recognizer if nobody has yet
pub async fn preload(State(state): State<AppState>) -> Json<StatusResponse> {
    let outcome = state.readiness.trigger_load();
    tracing::info!(?outcome, "Preload requested");
    Json(StatusResponse::from_trigger(&outcome))
}

/// Report recognizer readiness without side effects
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::from_state(&state.readiness.status()))
}

/// Detect shapes in a base64 image and read their text
pub async fn detect(
    State(state): State<AppState>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<Vec<DetectionRecord>>, ApiError> {
    let encoded = match payload {
        Ok(Json(DetectRequest { image: Some(image) })) => image,
        Ok(_) => return Err(ApiError::MissingImage),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(error = %rejection, "Detection request body over the size limit");
            return Err(ApiError::PayloadTooLarge(rejection.body_text()));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable detection request body");
            return Err(ApiError::MissingImage);
        }
    };

    let recognizer = match state.readiness.recognizer_if_ready() {
        Ok(recognizer) => recognizer,
        Err(NotReady(ReadinessState::Failed(reason))) => return Err(ApiError::LoadFailed(reason)),
        Err(NotReady(_)) => {
            // The first request to find nothing loaded kicks off the load
            let message = match state.readiness.trigger_load() {
                TriggerOutcome::Started => {
                    "OCR model loading has started, please try again in a moment"
                }
                TriggerOutcome::Failed(reason) => return Err(ApiError::LoadFailed(reason)),
                TriggerOutcome::AlreadyLoading | TriggerOutcome::AlreadyReady => {
                    "OCR model is still loading, please try again in a moment"
                }
            };
            return Err(ApiError::NotReady {
                message: message.to_string(),
            });
        }
    };

    let image = decode_image(&encoded)?;
    tracing::info!(
        width = image.width(),
        height = image.height(),
        "Received detection request"
    );

    let pipeline = state.pipeline.clone();
    let records = tokio::task::spawn_blocking(move || pipeline.annotate(&image, recognizer.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!(shapes = records.len() - 1, "Detection completed");

    Ok(Json(records))
}
