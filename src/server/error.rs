//! API error handling

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::pipeline::{ErrorPayload, PipelineError};

/// Message returned when the request carries no usable audio part.
pub const NO_AUDIO_MESSAGE: &str = "No audio file provided";

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }

    pub fn no_audio() -> Self {
        Self::bad_request(NO_AUDIO_MESSAGE)
    }

    /// 413 when the body limit is hit; any other unreadable multipart body
    /// counts as a request without audio.
    pub fn from_multipart(err: MultipartError) -> Self {
        let status = err.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Self {
                status,
                message: err.body_text(),
            };
        }
        log::debug!("voice-agent: unreadable multipart body: {}", err.body_text());
        Self::no_audio()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorPayload::new(self.message))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if err.is_client_error() {
            ApiError::bad_request(err.to_string())
        } else {
            ApiError::internal(err.to_string())
        }
    }
}
