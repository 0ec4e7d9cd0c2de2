//! Error taxonomy for the relay and its mapping onto HTTP responses.
//!
//! Every failure the handler can hit is one `RelayError` variant. The status
//! code is derived from the variant alone (`status_code`), and the response
//! body is always the `{ "success": false, "error": ... }` shape.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::enhance::response::EnhanceResponse;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("OpenAI API key not configured")]
    Configuration,

    #[error("Invalid JSON payload")]
    InvalidJson,

    #[error("Image data is required. Please provide imageBase64 field.")]
    MissingImage,

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("Invalid request to OpenAI: {0}")]
    ProviderRejected(String),

    // The provider's own text is dropped on purpose: it can describe the key.
    #[error("OpenAI API authentication failed")]
    ProviderAuth,

    #[error("OpenAI API rate limit exceeded. Please try again later.")]
    ProviderRateLimited,

    #[error("{0}")]
    ProviderServer(String),

    #[error("No image data received from OpenAI")]
    EmptyResult,

    #[error("Request timed out. Please try again.")]
    Timeout,

    #[error("Network error occurred. Please try again.")]
    Network(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, RelayError>;

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidJson
            | RelayError::MissingImage
            | RelayError::InvalidBase64(_)
            | RelayError::ProviderRejected(_) => StatusCode::BAD_REQUEST,
            RelayError::ProviderRateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::Configuration
            | RelayError::ProviderAuth
            | RelayError::ProviderServer(_)
            | RelayError::EmptyResult
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = ?self, "relay request failed");
        } else {
            tracing::warn!(%status, error = %self, "relay request rejected");
        }
        (status, Json(EnhanceResponse::failure(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        assert_eq!(RelayError::InvalidJson.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::InvalidBase64("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_ne!(
            RelayError::MissingImage.to_string(),
            RelayError::InvalidBase64("bad".into()).to_string()
        );
    }

    #[test]
    fn provider_errors_are_remapped() {
        assert_eq!(
            RelayError::ProviderRejected("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RelayError::ProviderAuth.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            RelayError::ProviderRateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            RelayError::ProviderServer("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(RelayError::EmptyResult.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn transport_errors_map_to_gateway_codes() {
        assert_eq!(RelayError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            RelayError::Network("dns".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        // reason is for logs only
        assert!(!RelayError::Network("dns failure".into()).to_string().contains("dns"));
    }

    #[test]
    fn internal_error_carries_description() {
        let err = RelayError::Internal("expected value at line 1".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error: expected value at line 1");
    }
}
