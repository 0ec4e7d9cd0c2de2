//! Inbound payload validation.
//!
//! Steps run in a fixed order and stop at the first failure:
//! JSON body -> `imageBase64` present -> data-URL prefix stripped -> base64
//! decoded -> prompt defaulted. `sceneData` is kept but never read.
//!
//! Decoding uses the standard alphabet with required padding. Non-zero
//! trailing bits in the last symbol are tolerated; ASCII whitespace is
//! dropped; any other character outside the alphabet is rejected.
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde_json::Value;

use crate::error::{AppResult, RelayError};

pub const DEFAULT_PROMPT: &str = "Convert this low-poly 3D street scene into a photorealistic urban environment with realistic lighting, textures, and details";

const DATA_URL_PREFIX: &str = "data:image/";
const LOG_PROMPT_CHARS: usize = 100;

const IMAGE_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone)]
pub struct EnhanceRequest {
    pub image: Vec<u8>,
    pub prompt: String,
    pub scene_data: Option<Value>,
}

impl EnhanceRequest {
    /// Run the whole pipeline over a raw request body.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> AppResult<Self> {
        let payload = parse_json_body(content_type, body)?;
        Self::from_json(payload)
    }

    pub fn from_json(payload: Value) -> AppResult<Self> {
        let Value::Object(mut fields) = payload else {
            return Err(RelayError::InvalidJson);
        };

        let encoded = match fields.get("imageBase64") {
            Some(Value::String(s)) if !s.is_empty() => s.as_str(),
            _ => return Err(RelayError::MissingImage),
        };
        tracing::info!("Image size: {} KB", encoded.len() / 1024);

        let image = decode_image(strip_data_url(encoded)?)?;
        tracing::info!("Decoded image size: {} KB", image.len() / 1024);

        let prompt = match fields.remove("prompt") {
            None | Some(Value::Null) => DEFAULT_PROMPT.to_string(),
            Some(Value::String(s)) => s,
            Some(_) => return Err(RelayError::InvalidJson),
        };
        tracing::info!("Prompt: {}...", prompt_preview(&prompt));

        Ok(EnhanceRequest {
            image,
            prompt,
            scene_data: fields.remove("sceneData"),
        })
    }
}

pub fn parse_json_body(content_type: Option<&str>, body: &[u8]) -> AppResult<Value> {
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(RelayError::InvalidJson);
    }
    serde_json::from_slice(body).map_err(|_| RelayError::InvalidJson)
}

/// Drop a `data:image/...;base64,` prefix, keeping everything after the first comma.
pub fn strip_data_url(encoded: &str) -> AppResult<&str> {
    if !encoded.starts_with(DATA_URL_PREFIX) {
        return Ok(encoded);
    }
    encoded
        .split_once(',')
        .map(|(_, rest)| rest)
        .ok_or_else(|| RelayError::InvalidBase64("data URL has no ',' separator".to_string()))
}

pub fn decode_image(encoded: &str) -> AppResult<Vec<u8>> {
    // Line-wrapped base64 is common from browsers and CLI tools.
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = IMAGE_B64
        .decode(compact.as_bytes())
        .map_err(|e| RelayError::InvalidBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(RelayError::InvalidBase64("image data is empty".to_string()));
    }
    Ok(bytes)
}

fn prompt_preview(prompt: &str) -> &str {
    match prompt.char_indices().nth(LOG_PROMPT_CHARS) {
        Some((idx, _)) => &prompt[..idx],
        None => prompt,
    }
}
