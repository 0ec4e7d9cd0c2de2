//! Image enhance relay library
//!
//! Modules:
//! - `api`: Axum handlers, shared state and router setup used by the binary.
//! - `enhance`: Inbound validation, the single forward, reply translation.
//! - `openai`: Thin client for the OpenAI image-edit endpoint.
//! - `config`: Env-driven configuration loader.
//! - `error`: Relay error taxonomy and its HTTP mapping.
//!
//! Re-exports are provided for common types: `Config`, `OpenAIClient`,
//! `AppState`, and `RelayError`.
pub mod api;
pub mod config;
pub mod enhance;
pub mod error;
pub mod openai;

pub use api::routes::{router, AppState};
pub use config::Config;
pub use error::{AppResult, RelayError};
pub use openai::client::OpenAIClient;
