//! The enhance pipeline: validate the inbound payload, forward it once to the
//! provider, translate the reply.
pub mod request;
pub mod response;

use crate::error::{AppResult, RelayError};
use crate::openai::client::{ImageEdit, ImageEditTransport, TransportOutcome};

pub use request::{EnhanceRequest, DEFAULT_PROMPT};
pub use response::{EnhanceResponse, EnhancedImage};

/// Forward a validated request and translate whatever comes back.
pub async fn forward(
    transport: &dyn ImageEditTransport,
    api_key: &str,
    request: EnhanceRequest,
) -> AppResult<EnhancedImage> {
    let edit = ImageEdit { image: request.image, prompt: request.prompt.clone() };
    match transport.send_edit(api_key, edit).await {
        TransportOutcome::Completed { status, body } => {
            response::translate_reply(status, &body, &request.prompt)
        }
        TransportOutcome::TimedOut => Err(RelayError::Timeout),
        TransportOutcome::Failed(reason) => Err(RelayError::Network(reason)),
    }
}
