use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VoiceError>;

/// Voice relay errors with appropriate HTTP status codes
///
/// Upstream failures map uniformly to a server-error status: the caller
/// cannot fix them, regardless of whose fault they are.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// Required input missing from the request
    #[error("{0}")]
    InvalidRequest(String),

    /// Provider returned a non-success status; message is the provider body
    #[error("Provider error ({status}): {message}")]
    ProviderApi { status: u16, message: String },

    /// Network or connection error reaching the provider
    #[error("Connection error: {0}")]
    Connection(String),

    /// Synthesis returned a body too small to be real audio
    #[error("Invalid response from TTS API: {0}")]
    InvalidAudioResponse(String),

    /// Provider reported the model's training as failed
    #[error("Model training failed: {0}")]
    TrainingFailed(String),

    /// Model never reached the trained state within the bound
    #[error("Model {model_id} not trained after {waited_seconds}s")]
    TrainingTimeout { model_id: String, waited_seconds: u64 },

    /// Credential or configuration missing at call time
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    /// If Some(message), it is safe to show; if None, details stay server-side
    #[error("Internal server error")]
    Internal(Option<String>),
}

impl VoiceError {
    /// Get the appropriate HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::TrainingTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::ProviderApi { .. }
            | Self::Connection(_)
            | Self::InvalidAudioResponse(_)
            | Self::TrainingFailed(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for logs
    pub const fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::ProviderApi { .. }
            | Self::Connection(_)
            | Self::InvalidAudioResponse(_)
            | Self::TrainingFailed(_) => "upstream_error",
            Self::TrainingTimeout { .. } => "training_timeout",
            Self::Config(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(Some(message)) => message.clone(),
            Self::Internal(None) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Failure body: every error carries a plain `error` string
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.client_message();

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Build a rejection response in the same `{"error": …}` shape
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_client_error() {
        let err = VoiceError::InvalidRequest("No voice file provided".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "No voice file provided");
    }

    #[test]
    fn upstream_failures_are_server_errors() {
        let api = VoiceError::ProviderApi {
            status: 402,
            message: "quota exceeded".into(),
        };
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.client_message().contains("quota exceeded"));

        let short = VoiceError::InvalidAudioResponse("{\"detail\":\"bad ref\"}".into());
        assert_eq!(short.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(short.client_message().contains("bad ref"));
    }

    #[test]
    fn training_timeout_is_distinct() {
        let err = VoiceError::TrainingTimeout {
            model_id: "abc".into(),
            waited_seconds: 180,
        };
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.error_type(), "training_timeout");
    }

    #[test]
    fn opaque_internal_error_does_not_leak() {
        let err = VoiceError::Internal(None);
        assert_eq!(err.client_message(), "Internal server error");
    }
}
