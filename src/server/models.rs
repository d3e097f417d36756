use base64::{Engine, engine::general_purpose::STANDARD};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::readiness::{ReadinessState, TriggerOutcome};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Base64-encoded image bytes, any format the decoder supports
    #[serde(default)]
    pub image: Option<String>,
}

/// Decode a base64 payload into a 3-channel image.
///
/// Whitespace anywhere in the payload is ignored, so MIME-style line-wrapped
/// base64 is accepted.
pub fn decode_image(encoded: &str) -> Result<DynamicImage, ApiError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting payload that is not valid base64");
        ApiError::InvalidImage
    })?;

    let image = image::load_from_memory(&bytes).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting payload that is not a decodable image");
        ApiError::InvalidImage
    })?;

    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// Body of the readiness endpoints and of deferred detection requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn from_state(state: &ReadinessState) -> Self {
        let message = match state {
            ReadinessState::Uninitialized => "OCR model loading has not started".to_string(),
            ReadinessState::Loading => "OCR model is still loading".to_string(),
            ReadinessState::Ready => "OCR model is loaded and ready".to_string(),
            ReadinessState::Failed(reason) => format!("OCR model failed to load: {}", reason),
        };
        Self::new(state.as_str(), message)
    }

    pub fn from_trigger(outcome: &TriggerOutcome) -> Self {
        match outcome {
            TriggerOutcome::Started => Self::new("started", "Started loading OCR model"),
            TriggerOutcome::AlreadyLoading => Self::new("loading", "OCR model is currently loading"),
            TriggerOutcome::AlreadyReady => Self::new("ready", "OCR model already loaded"),
            TriggerOutcome::Failed(reason) => {
                Self::new("failed", format!("OCR model failed to load: {}", reason))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
