//! Thin HTTP client for the OpenAI image-edit endpoint.
//!
//! The relay only ever makes one call: a multipart POST to `/images/edits`.
//! The client does not interpret the reply; it reports what happened on the
//! wire as a `TransportOutcome` and leaves the status mapping to
//! `enhance::response`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::error::{AppResult, RelayError};

pub const EDIT_MODEL: &str = "gpt-image-1";
pub const EDIT_SIZE: &str = "1024x1024";
pub const EDIT_QUALITY: &str = "low";
pub const EDIT_FILENAME: &str = "image.png";
pub const EDIT_MIME: &str = "image/png";

/// Upper bound for the single outbound call. There is no retry.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(300);

/// One image-edit call as sent to the provider.
#[derive(Debug, Clone)]
pub struct ImageEdit {
    pub image: Vec<u8>,
    pub prompt: String,
}

/// What happened to the outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// The provider answered; `status` may still be an error code.
    Completed { status: u16, body: String },
    TimedOut,
    Failed(String),
}

#[async_trait]
pub trait ImageEditTransport: Send + Sync {
    async fn send_edit(&self, api_key: &str, edit: ImageEdit) -> TransportOutcome;
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(base_url: String) -> AppResult<Self> {
        Self::with_timeout(base_url, PROVIDER_TIMEOUT)
    }

    /// Same as `new` with a custom bound on the whole call, body read included.
    pub fn with_timeout(base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(format!("failed to build HTTP client: {}", e)))?;
        let base = base_url.trim_end_matches('/').to_string();
        Ok(OpenAIClient { client, base_url: base })
    }

    pub fn edits_url(&self) -> String {
        format!("{}/images/edits", self.base_url)
    }

    fn build_form(edit: ImageEdit) -> Result<Form, reqwest::Error> {
        let image = Part::bytes(edit.image)
            .file_name(EDIT_FILENAME)
            .mime_str(EDIT_MIME)?;
        Ok(Form::new()
            .part("image", image)
            .text("prompt", edit.prompt)
            .text("model", EDIT_MODEL)
            .text("size", EDIT_SIZE)
            .text("quality", EDIT_QUALITY))
    }
}

#[async_trait]
impl ImageEditTransport for OpenAIClient {
    async fn send_edit(&self, api_key: &str, edit: ImageEdit) -> TransportOutcome {
        let url = self.edits_url();
        let form = match Self::build_form(edit) {
            Ok(form) => form,
            Err(e) => return TransportOutcome::Failed(e.to_string()),
        };
        tracing::info!("Sending request to OpenAI at URL: {}", url);

        let response = match self.client.post(&url).bearer_auth(api_key).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => return classify(e),
        };

        let status = response.status().as_u16();
        tracing::info!(status, "OpenAI API response status");
        match response.text().await {
            Ok(body) => TransportOutcome::Completed { status, body },
            Err(e) => classify(e),
        }
    }
}

fn classify(err: reqwest::Error) -> TransportOutcome {
    if err.is_timeout() {
        TransportOutcome::TimedOut
    } else {
        TransportOutcome::Failed(err.to_string())
    }
}
