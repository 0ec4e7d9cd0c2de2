//! Shared state and router construction.
use std::any::Any;
use std::sync::Arc;

use axum::body::{Bytes, Full};
use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use axum::http::{HeaderValue, Response, StatusCode};
use axum::routing::post;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::handlers;
use crate::config::Config;
use crate::enhance::EnhanceResponse;
use crate::error::RelayError;
use crate::openai::client::ImageEditTransport;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Immutable per-process state. Nothing in here changes after startup.
pub struct AppState {
    pub api_key: Option<String>,
    pub transport: Arc<dyn ImageEditTransport>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config, transport: Arc<dyn ImageEditTransport>) -> Self {
        AppState {
            api_key: config.openai_api_key.clone(),
            transport,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.max_body_bytes;
    let enhance = post(handlers::enhance).options(handlers::preflight);

    Router::new()
        .route("/", enhance.clone().get(handlers::root))
        .route("/enhance", enhance)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Full<Bytes>> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    let error = RelayError::Internal(details);
    tracing::error!(error = ?error, "panic while handling request");

    let body = serde_json::to_vec(&EnhanceResponse::failure(&error)).unwrap_or_default();
    let mut response = Response::new(Full::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
