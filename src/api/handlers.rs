//! Axum request handlers for the HTTP API.
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::routes::AppState;
use crate::enhance::{self, EnhanceRequest, EnhanceResponse, EnhancedImage};
use crate::error::{AppResult, RelayError};

pub async fn root() -> &'static str {
    "Image Enhance Relay"
}

/// CORS preflight. Origin and allowed headers are added by the router layers.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(ACCESS_CONTROL_ALLOW_METHODS, "POST"), (ACCESS_CONTROL_MAX_AGE, "3600")],
    )
}

pub async fn enhance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("enhance", %request_id);
    async move {
        tracing::info!("Processing image enhancement request");
        match relay(&state, &headers, body).await {
            Ok(image) => (StatusCode::OK, Json(EnhanceResponse::success(image))).into_response(),
            Err(err) => err.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn relay(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<EnhancedImage> {
    let api_key = state.api_key.as_deref().ok_or(RelayError::Configuration)?;
    let body = body.map_err(|rejection| RelayError::Internal(rejection.body_text()))?;
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    let request = EnhanceRequest::from_body(content_type, &body)?;

    // Detached so a dropped inbound connection does not cancel the provider call.
    let transport = Arc::clone(&state.transport);
    let api_key = api_key.to_string();
    let outbound = tokio::spawn(
        async move { enhance::forward(transport.as_ref(), &api_key, request).await }
            .in_current_span(),
    );
    match outbound.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(RelayError::Internal(err.to_string())),
    }
}
