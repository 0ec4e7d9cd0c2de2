//! Provider reply translation and the normalized response body.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppResult, RelayError};

const UNKNOWN_PROVIDER_ERROR: &str = "Unknown OpenAI API error";

/// A successful edit, ready to be sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedImage {
    pub image_b64: String,
    pub revised_prompt: String,
    pub original_prompt: String,
}

/// Body of every relay response. Build it through `success` or `failure` so
/// that `imageData` and `error` are never both present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceResponse {
    pub success: bool,
    #[serde(rename = "imageData", default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnhanceResponse {
    pub fn success(image: EnhancedImage) -> Self {
        EnhanceResponse {
            success: true,
            image_data: Some(image.image_b64),
            revised_prompt: Some(image.revised_prompt),
            original_prompt: Some(image.original_prompt),
            error: None,
        }
    }

    pub fn failure(err: &RelayError) -> Self {
        EnhanceResponse {
            success: false,
            image_data: None,
            revised_prompt: None,
            original_prompt: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EditReply {
    #[serde(default)]
    data: Vec<EditResult>,
}

#[derive(Debug, Deserialize)]
struct EditResult {
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

/// Map a completed provider call onto the relay's result.
pub fn translate_reply(status: u16, body: &str, original_prompt: &str) -> AppResult<EnhancedImage> {
    match status {
        200 => translate_success(body, original_prompt),
        400 => Err(RelayError::ProviderRejected(provider_message(body))),
        401 => {
            tracing::error!("OpenAI API error (401): {}", body);
            Err(RelayError::ProviderAuth)
        }
        429 => Err(RelayError::ProviderRateLimited),
        other => {
            tracing::error!("OpenAI API error ({}): {}", other, body);
            Err(RelayError::ProviderServer(provider_message(body)))
        }
    }
}

fn translate_success(body: &str, original_prompt: &str) -> AppResult<EnhancedImage> {
    let reply: EditReply = serde_json::from_str(body)
        .map_err(|e| RelayError::Internal(format!("unreadable OpenAI response: {}", e)))?;

    let Some(first) = reply.data.into_iter().next() else {
        tracing::warn!("No image data in OpenAI response");
        return Err(RelayError::EmptyResult);
    };
    let Some(image_b64) = first.b64_json.filter(|b| !b.is_empty()) else {
        tracing::warn!("OpenAI result entry carried no b64_json");
        return Err(RelayError::EmptyResult);
    };

    tracing::info!("Image enhancement successful");
    Ok(EnhancedImage {
        image_b64,
        revised_prompt: first.revised_prompt.unwrap_or_else(|| original_prompt.to_string()),
        original_prompt: original_prompt.to_string(),
    })
}

/// Best-effort `error.message` from an OpenAI error body, raw text otherwise.
fn provider_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error") {
            None => UNKNOWN_PROVIDER_ERROR.to_string(),
            Some(Value::Object(err)) => err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(UNKNOWN_PROVIDER_ERROR)
                .to_string(),
            Some(_) => body.to_string(),
        },
        Ok(_) | Err(_) => body.to_string(),
    }
}
